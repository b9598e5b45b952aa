use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use trivia_core::model::{PlayerId, QuestionId, SessionSummary};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Aggregated answer counts for one question across all players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestionStats {
    pub shown: u32,
    pub correct: u32,
}

impl QuestionStats {
    /// Share of correct answers in percent, `None` before the first answer.
    #[must_use]
    pub fn percent_correct(&self) -> Option<f64> {
        (self.shown > 0).then(|| f64::from(self.correct) * 100.0 / f64::from(self.shown))
    }

    fn record(&mut self, correct: bool) {
        self.shown = self.shown.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
    }
}

/// Persisted summary plus its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummaryRow {
    pub id: i64,
    pub summary: SessionSummary,
}

impl SessionSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: SessionSummary) -> Self {
        Self { id, summary }
    }
}

/// Shared per-question answer statistics (the backend table).
#[async_trait]
pub trait QuestionStatsRepository: Send + Sync {
    /// Count one answer for the question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the counters cannot be updated.
    async fn record_answer(&self, id: &QuestionId, correct: bool) -> Result<(), StorageError>;

    /// Fetch counters for a question; unknown questions have zero counts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_stats(&self, id: &QuestionId) -> Result<QuestionStats, StorageError>;

    /// Every question with at least one recorded answer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn all_stats(&self) -> Result<Vec<(QuestionId, QuestionStats)>, StorageError>;
}

/// Per-player local state: rating and the questions shown on each day.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_rating(&self, player: &PlayerId) -> Result<Option<i64>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the rating cannot be stored.
    async fn set_rating(
        &self,
        player: &PlayerId,
        rating: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Questions shown to the player on `day`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn seen_on(
        &self,
        player: &PlayerId,
        day: NaiveDate,
    ) -> Result<HashSet<QuestionId>, StorageError>;

    /// Remember that `id` was shown on `day`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the mark cannot be stored.
    async fn mark_seen(
        &self,
        player: &PlayerId,
        day: NaiveDate,
        id: &QuestionId,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SessionSummaryRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError>;

    /// Most recent summaries for a player, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_summaries(
        &self,
        player: &PlayerId,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    stats: Arc<Mutex<HashMap<QuestionId, QuestionStats>>>,
    ratings: Arc<Mutex<HashMap<PlayerId, i64>>>,
    seen: Arc<Mutex<HashMap<(PlayerId, NaiveDate), HashSet<QuestionId>>>>,
    summaries: Arc<Mutex<Vec<SessionSummary>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl QuestionStatsRepository for InMemoryRepository {
    async fn record_answer(&self, id: &QuestionId, correct: bool) -> Result<(), StorageError> {
        lock(&self.stats)?
            .entry(id.clone())
            .or_default()
            .record(correct);
        Ok(())
    }

    async fn get_stats(&self, id: &QuestionId) -> Result<QuestionStats, StorageError> {
        Ok(lock(&self.stats)?.get(id).copied().unwrap_or_default())
    }

    async fn all_stats(&self) -> Result<Vec<(QuestionId, QuestionStats)>, StorageError> {
        let mut out: Vec<_> = lock(&self.stats)?
            .iter()
            .map(|(id, stats)| (id.clone(), *stats))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryRepository {
    async fn get_rating(&self, player: &PlayerId) -> Result<Option<i64>, StorageError> {
        Ok(lock(&self.ratings)?.get(player).copied())
    }

    async fn set_rating(
        &self,
        player: &PlayerId,
        rating: i64,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        lock(&self.ratings)?.insert(player.clone(), rating);
        Ok(())
    }

    async fn seen_on(
        &self,
        player: &PlayerId,
        day: NaiveDate,
    ) -> Result<HashSet<QuestionId>, StorageError> {
        Ok(lock(&self.seen)?
            .get(&(player.clone(), day))
            .cloned()
            .unwrap_or_default())
    }

    async fn mark_seen(
        &self,
        player: &PlayerId,
        day: NaiveDate,
        id: &QuestionId,
    ) -> Result<(), StorageError> {
        lock(&self.seen)?
            .entry((player.clone(), day))
            .or_default()
            .insert(id.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let mut guard = lock(&self.summaries)?;
        guard.push(summary.clone());
        i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("summary id overflow".into()))
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let index = usize::try_from(id - 1).map_err(|_| StorageError::NotFound)?;
        lock(&self.summaries)?
            .get(index)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_summaries(
        &self,
        player: &PlayerId,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let guard = lock(&self.summaries)?;
        let mut rows = Vec::new();
        for (index, summary) in guard.iter().enumerate() {
            if summary.player_id() != player {
                continue;
            }
            let id = i64::try_from(index + 1)
                .map_err(|_| StorageError::Serialization("summary id overflow".into()))?;
            rows.push(SessionSummaryRow::new(id, summary.clone()));
        }
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub stats: Arc<dyn QuestionStatsRepository>,
    pub players: Arc<dyn PlayerRepository>,
    pub summaries: Arc<dyn SessionSummaryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            stats: Arc::new(repo.clone()),
            players: Arc::new(repo.clone()),
            summaries: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::SessionMode;
    use trivia_core::time::fixed_now;

    fn summary(player: &str, minutes: i64) -> SessionSummary {
        let at = fixed_now() + chrono::Duration::minutes(minutes);
        SessionSummary::from_persisted(
            PlayerId::new(player),
            SessionMode::Standard,
            at,
            at,
            5,
            3,
            1500,
            1510,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn stats_accumulate_per_question() {
        let repo = InMemoryRepository::new();
        let id = QuestionId::new("rd-1");
        repo.record_answer(&id, true).await.unwrap();
        repo.record_answer(&id, false).await.unwrap();
        repo.record_answer(&id, true).await.unwrap();

        let stats = repo.get_stats(&id).await.unwrap();
        assert_eq!(stats, QuestionStats { shown: 3, correct: 2 });
        assert_eq!(
            repo.get_stats(&QuestionId::new("other")).await.unwrap(),
            QuestionStats::default()
        );
        assert_eq!(repo.all_stats().await.unwrap().len(), 1);
    }

    #[test]
    fn percent_correct_needs_answers() {
        assert_eq!(QuestionStats::default().percent_correct(), None);
        let stats = QuestionStats { shown: 4, correct: 1 };
        assert_eq!(stats.percent_correct(), Some(25.0));
    }

    #[tokio::test]
    async fn seen_sets_are_keyed_by_day() {
        let repo = InMemoryRepository::new();
        let player = PlayerId::new("local");
        let today = fixed_now().date_naive();
        let tomorrow = today.succ_opt().unwrap();

        repo.mark_seen(&player, today, &QuestionId::new("rd-1"))
            .await
            .unwrap();
        repo.mark_seen(&player, today, &QuestionId::new("rd-1"))
            .await
            .unwrap();

        assert_eq!(repo.seen_on(&player, today).await.unwrap().len(), 1);
        assert!(repo.seen_on(&player, tomorrow).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rating_round_trips() {
        let repo = InMemoryRepository::new();
        let player = PlayerId::new("local");
        assert_eq!(repo.get_rating(&player).await.unwrap(), None);
        repo.set_rating(&player, 1486, fixed_now()).await.unwrap();
        assert_eq!(repo.get_rating(&player).await.unwrap(), Some(1486));
    }

    #[tokio::test]
    async fn summaries_list_newest_first_per_player() {
        let repo = InMemoryRepository::new();
        let first = repo.append_summary(&summary("a", 0)).await.unwrap();
        repo.append_summary(&summary("b", 1)).await.unwrap();
        let third = repo.append_summary(&summary("a", 2)).await.unwrap();

        let rows = repo.list_summaries(&PlayerId::new("a"), 10).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![third, first]);

        let limited = repo.list_summaries(&PlayerId::new("a"), 1).await.unwrap();
        assert_eq!(limited.len(), 1);

        assert!(matches!(
            repo.get_summary(99).await.unwrap_err(),
            StorageError::NotFound
        ));
        assert!(matches!(
            repo.get_summary(0).await.unwrap_err(),
            StorageError::NotFound
        ));
    }
}
