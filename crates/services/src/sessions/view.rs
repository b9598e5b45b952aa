use chrono::{DateTime, Utc};
use std::sync::Arc;

use storage::repository::{SessionSummaryRepository, SessionSummaryRow};
use trivia_core::model::{PlayerId, SessionMode, SessionSummary};

use crate::error::SessionError;

/// Storage identifier for a persisted session summary.
pub type SessionSummaryId = i64;

/// Presentation-agnostic list item for a session summary.
///
/// No pre-formatted strings; front ends format timestamps and scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummaryListItem {
    pub id: SessionSummaryId,
    pub mode: SessionMode,
    pub completed_at: DateTime<Utc>,
    pub total: u32,
    pub correct: u32,
    pub rating_after: i64,
    pub rating_change: i64,
}

impl SessionSummaryListItem {
    #[must_use]
    pub fn from_summary(id: SessionSummaryId, summary: &SessionSummary) -> Self {
        Self {
            id,
            mode: summary.mode(),
            completed_at: summary.completed_at(),
            total: summary.total(),
            correct: summary.correct(),
            rating_after: summary.rating_after(),
            rating_change: summary.rating_change(),
        }
    }

    #[must_use]
    pub fn from_row(row: &SessionSummaryRow) -> Self {
        Self::from_summary(row.id, &row.summary)
    }
}

/// Read side of persisted session summaries.
#[derive(Clone)]
pub struct SessionHistoryService {
    summaries: Arc<dyn SessionSummaryRepository>,
}

impl SessionHistoryService {
    #[must_use]
    pub fn new(summaries: Arc<dyn SessionSummaryRepository>) -> Self {
        Self { summaries }
    }

    /// Most recent sessions for the player, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn list_recent(
        &self,
        player: &PlayerId,
        limit: u32,
    ) -> Result<Vec<SessionSummaryListItem>, SessionError> {
        let rows = self.summaries.list_summaries(player, limit).await?;
        Ok(rows.iter().map(SessionSummaryListItem::from_row).collect())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the summary is missing or storage fails.
    pub async fn get_summary(&self, id: SessionSummaryId) -> Result<SessionSummary, SessionError> {
        Ok(self.summaries.get_summary(id).await?)
    }
}
