use chrono::{DateTime, Utc};

use crate::model::ids::{ChoiceId, QuestionId};

/// Record of a single answered question.
///
/// Carries everything the stats table and the session summary need; the
/// question itself is looked up again through the catalog when required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLog {
    pub question_id: QuestionId,
    pub choice: ChoiceId,
    pub correct: bool,
    pub rating_delta: i64,
    pub answered_at: DateTime<Utc>,
}

impl AnswerLog {
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        choice: ChoiceId,
        correct: bool,
        rating_delta: i64,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            question_id,
            choice,
            correct,
            rating_delta,
            answered_at,
        }
    }
}
