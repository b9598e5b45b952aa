#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod sessions;
pub mod stats_service;

pub use trivia_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, SessionError, StatsServiceError};
pub use stats_service::{QuestionReport, StatsService};

pub use sessions::{
    AnsweredQuestion, QuizSession, SessionAnswerResult, SessionHistoryService, SessionLoopService,
    SessionPlan, SessionProgress, SessionSummaryId, SessionSummaryListItem,
};
