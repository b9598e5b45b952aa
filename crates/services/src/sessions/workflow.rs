use std::collections::HashSet;
use std::sync::Arc;

use storage::repository::{PlayerRepository, QuestionStatsRepository, SessionSummaryRepository};
use trivia_core::Catalog;
use trivia_core::model::{ChoiceId, PlayerId, SessionMode};
use trivia_core::rating::INITIAL_RATING;

use super::plan::plan_session;
use super::service::{AnsweredQuestion, QuizSession};
use crate::Clock;
use crate::error::SessionError;

/// Result of answering a single question in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAnswerResult {
    pub answer: AnsweredQuestion,
    pub is_complete: bool,
    pub summary_id: Option<i64>,
}

/// Orchestrates session start and persisted answering.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    catalog: Arc<Catalog>,
    stats: Arc<dyn QuestionStatsRepository>,
    players: Arc<dyn PlayerRepository>,
    summaries: Arc<dyn SessionSummaryRepository>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<Catalog>,
        stats: Arc<dyn QuestionStatsRepository>,
        players: Arc<dyn PlayerRepository>,
        summaries: Arc<dyn SessionSummaryRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            stats,
            players,
            summaries,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current rating, or [`INITIAL_RATING`] for a new player.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn player_rating(&self, player: &PlayerId) -> Result<i64, SessionError> {
        Ok(self
            .players
            .get_rating(player)
            .await?
            .unwrap_or(INITIAL_RATING))
    }

    /// Start a new session in the given mode.
    ///
    /// Standard and data-only sessions avoid the questions the player already
    /// answered today; the daily challenge is the same for everyone.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the catalog has nothing for this mode,
    /// or `SessionError::Storage` for repository failures.
    pub async fn start_session(
        &self,
        player: &PlayerId,
        mode: SessionMode,
    ) -> Result<QuizSession, SessionError> {
        let now = self.clock.now();
        let today = self.clock.today();

        let excluded = match mode {
            SessionMode::Daily => HashSet::new(),
            SessionMode::Standard | SessionMode::DataOnly => {
                self.players.seen_on(player, today).await?
            }
        };
        let seen_today = excluded.len();

        let plan = plan_session(&self.catalog, mode, excluded, today, &mut rand::rng());
        if plan.is_short() {
            tracing::warn!(
                %mode,
                requested = plan.requested,
                available = plan.total(),
                "insufficient content for a full session"
            );
        }
        tracing::info!(
            %player,
            %mode,
            questions = plan.total(),
            seen_today,
            used_fallback = plan.used_fallback,
            composition = ?plan.composition,
            "session started"
        );

        let rating = self.player_rating(player).await?;
        QuizSession::new(player.clone(), mode, plan.questions, rating, now)
    }

    /// Answer the current question and persist the outcome.
    ///
    /// The rating and the seen-today mark are written before the session
    /// advances, so a failed write leaves the question current and the call
    /// can be retried. Question statistics are best effort: a failed write is
    /// logged and the session continues. On completion the summary is required.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for invalid answers or persistence failures.
    pub async fn answer_current(
        &self,
        session: &mut QuizSession,
        choice: &ChoiceId,
    ) -> Result<SessionAnswerResult, SessionError> {
        let answered_at = self.clock.now();
        let answer = session.evaluate_answer(choice, answered_at)?;
        let question_id = &answer.log.question_id;

        let player = session.player_id().clone();
        self.players
            .set_rating(&player, answer.rating.new_rating, answered_at)
            .await?;
        self.players
            .mark_seen(&player, answered_at.date_naive(), question_id)
            .await?;
        session.commit_answer(answer.clone())?;

        if let Err(err) = self
            .stats
            .record_answer(question_id, answer.log.correct)
            .await
        {
            tracing::warn!(%question_id, error = %err, "failed to record question stats");
        }

        if session.is_complete() && session.summary_id().is_none() {
            let completed_at = session.completed_at().ok_or(SessionError::Completed)?;
            let summary = session.build_summary(completed_at)?;
            let summary_id = self.summaries.append_summary(&summary).await?;
            session.set_summary_id(summary_id);
            tracing::info!(
                %player,
                summary_id,
                correct = summary.correct(),
                total = summary.total(),
                rating = summary.rating_after(),
                "session completed"
            );
        }

        Ok(SessionAnswerResult {
            answer,
            is_complete: session.is_complete(),
            summary_id: session.summary_id(),
        })
    }

    /// Stop a session early.
    ///
    /// The question on screen counts as shown today, so the next same-day
    /// session avoids it. Nothing else is written and no summary is kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the seen-today mark cannot be written.
    pub async fn abandon_session(&self, session: &QuizSession) -> Result<(), SessionError> {
        let Some(question) = session.current_question() else {
            return Ok(());
        };
        let player = session.player_id();
        self.players
            .mark_seen(player, self.clock.today(), question.id())
            .await?;
        tracing::info!(
            %player,
            answered = session.answered_count(),
            total = session.total_questions(),
            "session abandoned"
        );
        Ok(())
    }

    /// Retry summary persistence after a completed session.
    ///
    /// Useful when the final summary append failed (e.g. transient storage error).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotComplete` if the session is still running.
    /// Returns `SessionError::Storage` if persistence fails.
    pub async fn finalize_summary(&self, session: &mut QuizSession) -> Result<i64, SessionError> {
        if let Some(id) = session.summary_id() {
            return Ok(id);
        }

        let completed_at = session.completed_at().ok_or(SessionError::NotComplete)?;
        let summary = session.build_summary(completed_at)?;
        let id = self.summaries.append_summary(&summary).await?;
        session.set_summary_id(id);
        Ok(id)
    }
}
