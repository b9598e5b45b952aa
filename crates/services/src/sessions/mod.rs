mod plan;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{SessionPlan, SessionPlanner, plan_session};
pub use progress::SessionProgress;
pub use service::{AnsweredQuestion, QuizSession};
pub use view::{SessionHistoryService, SessionSummaryId, SessionSummaryListItem};
pub use workflow::{SessionAnswerResult, SessionLoopService};
