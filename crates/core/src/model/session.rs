use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{AnswerLog, PlayerId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many answers for a single session: {len}")]
    TooManyAnswers { len: usize },

    #[error("correct answers ({correct}) exceed total ({total})")]
    CountMismatch { total: u32, correct: u32 },

    #[error("unknown session mode: {0}")]
    UnknownMode(String),
}

/// How the questions of a session were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Weighted category mix with bias balancing.
    Standard,
    /// Real-data questions only.
    DataOnly,
    /// Date-seeded challenge shared by every player on the same day.
    Daily,
}

impl SessionMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Standard => "standard",
            SessionMode::DataOnly => "data_only",
            SessionMode::Daily => "daily",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = SessionSummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "data_only" => Ok(Self::DataOnly),
            "daily" => Ok(Self::Daily),
            other => Err(SessionSummaryError::UnknownMode(other.to_owned())),
        }
    }
}

/// Aggregate summary for a completed quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    player_id: PlayerId,
    mode: SessionMode,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total: u32,
    correct: u32,
    rating_before: i64,
    rating_after: i64,
}

impl SessionSummary {
    /// Rehydrate a session summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` or `CountMismatch` if the
    /// stored values are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        player_id: PlayerId,
        mode: SessionMode,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total: u32,
        correct: u32,
        rating_before: i64,
        rating_after: i64,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if correct > total {
            return Err(SessionSummaryError::CountMismatch { total, correct });
        }

        Ok(Self {
            player_id,
            mode,
            started_at,
            completed_at,
            total,
            correct,
            rating_before,
            rating_after,
        })
    }

    /// Build a summary from the answers given during a session.
    ///
    /// The final rating is `rating_before` plus the sum of every answer's delta.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SessionSummaryError::TooManyAnswers` if the answer count cannot fit in `u32`.
    pub fn from_answers(
        player_id: PlayerId,
        mode: SessionMode,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        answers: &[AnswerLog],
        rating_before: i64,
    ) -> Result<Self, SessionSummaryError> {
        let total = u32::try_from(answers.len())
            .map_err(|_| SessionSummaryError::TooManyAnswers { len: answers.len() })?;
        let mut correct = 0_u32;
        let mut rating_after = rating_before;
        for answer in answers {
            if answer.correct {
                correct = correct.saturating_add(1);
            }
            rating_after = rating_after.saturating_add(answer.rating_delta);
        }

        Self::from_persisted(
            player_id,
            mode,
            started_at,
            completed_at,
            total,
            correct,
            rating_before,
            rating_after,
        )
    }

    #[must_use]
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn rating_before(&self) -> i64 {
        self.rating_before
    }

    #[must_use]
    pub fn rating_after(&self) -> i64 {
        self.rating_after
    }

    #[must_use]
    pub fn rating_change(&self) -> i64 {
        self.rating_after - self.rating_before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChoiceId, QuestionId};
    use crate::time::fixed_now;

    fn answer(id: &str, correct: bool, delta: i64) -> AnswerLog {
        AnswerLog::new(
            QuestionId::new(id),
            ChoiceId::new("a"),
            correct,
            delta,
            fixed_now(),
        )
    }

    #[test]
    fn summary_counts_answers_and_rating() {
        let now = fixed_now();
        let answers = vec![
            answer("rd-1", true, 10),
            answer("rd-2", false, -14),
            answer("th-1", true, 5),
            answer("kn-1", false, -19),
            answer("rd-3", true, 10),
        ];

        let summary = SessionSummary::from_answers(
            PlayerId::new("local"),
            SessionMode::Standard,
            now,
            now,
            &answers,
            1500,
        )
        .unwrap();

        assert_eq!(summary.total(), 5);
        assert_eq!(summary.correct(), 3);
        assert_eq!(summary.rating_after(), 1492);
        assert_eq!(summary.rating_change(), -8);
    }

    #[test]
    fn completed_before_started_is_rejected() {
        let now = fixed_now();
        let err = SessionSummary::from_answers(
            PlayerId::new("local"),
            SessionMode::Daily,
            now,
            now - chrono::Duration::seconds(1),
            &[],
            1500,
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn persisted_counts_must_be_consistent() {
        let now = fixed_now();
        let err = SessionSummary::from_persisted(
            PlayerId::new("local"),
            SessionMode::Standard,
            now,
            now,
            2,
            3,
            1500,
            1500,
        )
        .unwrap_err();
        assert!(matches!(err, SessionSummaryError::CountMismatch { .. }));
    }

    #[test]
    fn mode_round_trips_through_str() {
        for mode in [SessionMode::Standard, SessionMode::DataOnly, SessionMode::Daily] {
            assert_eq!(mode.as_str().parse::<SessionMode>().unwrap(), mode);
        }
        assert!("weekly".parse::<SessionMode>().is_err());
    }
}
