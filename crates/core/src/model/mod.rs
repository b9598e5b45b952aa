mod answer;
mod ids;
mod question;
mod session;

pub use answer::AnswerLog;
pub use ids::{ChoiceId, ParseIdError, PlayerId, QuestionId};
pub use question::{
    BiasLevel, Category, Choice, Difficulty, FEATURED_ENTITIES, MAX_CHOICES, MIN_CHOICES, Question,
    QuestionDraft, QuestionError,
};
pub use session::{SessionMode, SessionSummary, SessionSummaryError};
