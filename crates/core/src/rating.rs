//! Elo-style player rating.
//!
//! A question's difficulty stands in for the opponent: the expected score is
//! `(6 - difficulty) / 5`, so a difficulty-1 question is a sure thing (1.0)
//! and a difficulty-5 question is expected to be missed (0.2). Ratings are not
//! clamped and may drift below zero.

use crate::model::Difficulty;

/// Fixed K-factor.
pub const K_FACTOR: f64 = 24.0;

/// Rating assigned to a player with no history.
pub const INITIAL_RATING: i64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChange {
    pub new_rating: i64,
    pub delta: i64,
}

/// Probability of a correct answer implied by the difficulty.
#[must_use]
pub fn expected_score(difficulty: Difficulty) -> f64 {
    f64::from(6 - difficulty.value()) / 5.0
}

// `delta` is bounded by K_FACTOR in magnitude.
#[allow(clippy::cast_possible_truncation)]
fn delta(actual: f64, difficulty: Difficulty) -> i64 {
    (K_FACTOR * (actual - expected_score(difficulty))).round() as i64
}

#[must_use]
pub fn after_correct(rating: i64, difficulty: Difficulty) -> RatingChange {
    let delta = delta(1.0, difficulty);
    RatingChange {
        new_rating: rating.saturating_add(delta),
        delta,
    }
}

#[must_use]
pub fn after_incorrect(rating: i64, difficulty: Difficulty) -> RatingChange {
    let delta = delta(0.0, difficulty);
    RatingChange {
        new_rating: rating.saturating_add(delta),
        delta,
    }
}

#[must_use]
pub fn apply(rating: i64, difficulty: Difficulty, correct: bool) -> RatingChange {
    if correct {
        after_correct(rating, difficulty)
    } else {
        after_incorrect(rating, difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: u8) -> Difficulty {
        Difficulty::new(v).unwrap()
    }

    #[test]
    fn correct_answer_on_medium_question() {
        let change = after_correct(1500, d(3));
        assert_eq!(change.delta, 10);
        assert_eq!(change.new_rating, 1510);
    }

    #[test]
    fn incorrect_answer_on_medium_question() {
        let change = after_incorrect(1500, d(3));
        assert_eq!(change.delta, -14);
        assert_eq!(change.new_rating, 1486);
    }

    #[test]
    fn easiest_question_gives_nothing_when_correct() {
        assert_eq!(after_correct(1500, d(1)).delta, 0);
        assert_eq!(after_incorrect(1500, d(1)).delta, -24);
    }

    #[test]
    fn hardest_question_rewards_most() {
        // 24 * 0.8 = 19.2
        assert_eq!(after_correct(1500, d(5)).delta, 19);
        // 24 * -0.2 = -4.8
        assert_eq!(after_incorrect(1500, d(5)).delta, -5);
    }

    #[test]
    fn incorrect_never_raises_rating() {
        for v in 1..=5 {
            assert!(after_incorrect(1500, d(v)).delta <= 0);
            assert!(after_correct(1500, d(v)).delta >= 0);
        }
    }

    #[test]
    fn rating_is_not_clamped() {
        let change = after_incorrect(3, d(1));
        assert_eq!(change.new_rating, -21);
    }

    #[test]
    fn extreme_ratings_saturate() {
        let top = after_correct(i64::MAX, d(5));
        assert_eq!(top.delta, 19);
        assert_eq!(top.new_rating, i64::MAX);

        let bottom = after_incorrect(i64::MIN, d(1));
        assert_eq!(bottom.delta, -24);
        assert_eq!(bottom.new_rating, i64::MIN);
    }

    #[test]
    fn apply_dispatches_on_correctness() {
        assert_eq!(apply(1500, d(3), true), after_correct(1500, d(3)));
        assert_eq!(apply(1500, d(3), false), after_incorrect(1500, d(3)));
    }
}
