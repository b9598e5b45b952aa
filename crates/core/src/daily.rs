//! Date-seeded daily challenge.
//!
//! Every player gets the same questions on a given calendar day: the date
//! string is hashed into a 32-bit seed that drives a Fisher–Yates shuffle of
//! the (optionally category-filtered) catalog.

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::model::{Category, Question};

/// Questions in the daily challenge.
pub const DAILY_SIZE: usize = 5;

/// 32-bit rolling hash of a string (`h = h * 31 + byte`, wrapping).
#[must_use]
pub fn date_seed(date: &str) -> u32 {
    date.bytes()
        .fold(0_u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
}

/// Canonical `YYYY-MM-DD` key for a day.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Deterministic selection for `date`: shuffle the filtered subset in catalog
/// order with the date seed and take the first `count`.
#[must_use]
pub fn select_daily(
    pool: &[Question],
    date: NaiveDate,
    count: usize,
    category: Option<Category>,
) -> Vec<Question> {
    let mut subset: Vec<&Question> = pool
        .iter()
        .filter(|q| category.is_none_or(|c| q.category() == c))
        .collect();

    let mut rng = StdRng::seed_from_u64(u64::from(date_seed(&date_key(date))));
    subset.shuffle(&mut rng);
    subset.into_iter().take(count).cloned().collect()
}
