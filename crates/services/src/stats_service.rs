use std::collections::HashMap;
use std::sync::Arc;

use storage::repository::{QuestionStats, QuestionStatsRepository};
use trivia_core::Catalog;
use trivia_core::model::{Category, QuestionId};

use crate::error::StatsServiceError;

/// Per-question answer counts joined with catalog metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReport {
    pub question_id: QuestionId,
    pub number: u32,
    pub category: Category,
    pub shown: u32,
    pub correct: u32,
    /// `None` until the question has been answered at least once.
    pub percent_correct: Option<f64>,
}

impl QuestionReport {
    fn new(question_id: QuestionId, number: u32, category: Category, stats: QuestionStats) -> Self {
        Self {
            question_id,
            number,
            category,
            shown: stats.shown,
            correct: stats.correct,
            percent_correct: stats.percent_correct(),
        }
    }
}

/// Read side of the shared question statistics.
#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn QuestionStatsRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(stats: Arc<dyn QuestionStatsRepository>) -> Self {
        Self { stats }
    }

    /// Report every catalog question in catalog order, including unanswered ones.
    ///
    /// Stats for questions no longer in the catalog are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` on repository failures.
    pub async fn question_report(
        &self,
        catalog: &Catalog,
    ) -> Result<Vec<QuestionReport>, StatsServiceError> {
        let recorded: HashMap<QuestionId, QuestionStats> =
            self.stats.all_stats().await?.into_iter().collect();

        let orphaned = recorded
            .keys()
            .filter(|id| catalog.get(id).is_none())
            .count();
        if orphaned > 0 {
            tracing::debug!(orphaned, "stats recorded for questions missing from catalog");
        }

        Ok(catalog
            .questions()
            .iter()
            .map(|question| {
                let stats = recorded.get(question.id()).copied().unwrap_or_default();
                QuestionReport::new(
                    question.id().clone(),
                    question.number(),
                    question.category(),
                    stats,
                )
            })
            .collect())
    }
}
