use chrono::{DateTime, Utc};
use std::fmt;

use trivia_core::model::{AnswerLog, ChoiceId, PlayerId, Question, SessionMode, SessionSummary};
use trivia_core::rating::{self, RatingChange};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── ANSWER RESULT ─────────────────────────────────────────────────────────────
//

/// Captures the outcome of answering a question within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub log: AnswerLog,
    pub correct_choice: ChoiceId,
    pub rating: RatingChange,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session.
///
/// Steps through the planned questions in order, checking answers and
/// carrying the player's rating forward after each one.
pub struct QuizSession {
    player_id: PlayerId,
    mode: SessionMode,
    questions: Vec<Question>,
    current: usize,
    results: Vec<AnsweredQuestion>,
    rating_before: i64,
    rating: i64,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    summary_id: Option<i64>,
}

impl QuizSession {
    /// Create a session over the planned questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        player_id: PlayerId,
        mode: SessionMode,
        questions: Vec<Question>,
        rating: i64,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            player_id,
            mode,
            questions,
            current: 0,
            results: Vec::new(),
            rating_before: rating,
            rating,
            started_at,
            completed_at: None,
            summary_id: None,
        })
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
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn summary_id(&self) -> Option<i64> {
        self.summary_id
    }

    #[must_use]
    pub fn results(&self) -> &[AnsweredQuestion] {
        &self.results
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Rating at session start.
    #[must_use]
    pub fn rating_before(&self) -> i64 {
        self.rating_before
    }

    /// Rating after the answers given so far.
    #[must_use]
    pub fn rating(&self) -> i64 {
        self.rating
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.questions.len().saturating_sub(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions(),
            answered: self.answered_count(),
            remaining: self.remaining(),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Answer the current question and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished and
    /// `SessionError::UnknownChoice` if `choice` is not an option of the current
    /// question; neither advances the session.
    pub fn answer_current(
        &mut self,
        choice: &ChoiceId,
        answered_at: DateTime<Utc>,
    ) -> Result<&AnsweredQuestion, SessionError> {
        let answered = self.evaluate_answer(choice, answered_at)?;
        self.commit_answer(answered)
    }

    /// Score `choice` against the current question without advancing.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::answer_current`].
    pub fn evaluate_answer(
        &self,
        choice: &ChoiceId,
        answered_at: DateTime<Utc>,
    ) -> Result<AnsweredQuestion, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let question = self.current_question().ok_or(SessionError::Completed)?;
        if !question.has_choice(choice) {
            return Err(SessionError::UnknownChoice(choice.clone()));
        }

        let correct = question.is_correct(choice);
        let change = rating::apply(self.rating, question.difficulty(), correct);
        Ok(AnsweredQuestion {
            log: AnswerLog::new(
                question.id().clone(),
                choice.clone(),
                correct,
                change.delta,
                answered_at,
            ),
            correct_choice: question.correct().clone(),
            rating: change,
        })
    }

    /// Record an answer produced by [`QuizSession::evaluate_answer`] and advance.
    pub(crate) fn commit_answer(
        &mut self,
        answered: AnsweredQuestion,
    ) -> Result<&AnsweredQuestion, SessionError> {
        let answered_at = answered.log.answered_at;
        self.rating = answered.rating.new_rating;
        self.results.push(answered);
        self.current += 1;
        if self.current >= self.questions.len() {
            self.completed_at = Some(answered_at);
        }

        self.results.last().ok_or(SessionError::Completed)
    }

    pub(crate) fn build_summary(
        &self,
        completed_at: DateTime<Utc>,
    ) -> Result<SessionSummary, SessionError> {
        let logs: Vec<_> = self.results.iter().map(|r| r.log.clone()).collect();
        Ok(SessionSummary::from_answers(
            self.player_id.clone(),
            self.mode,
            self.started_at,
            completed_at,
            &logs,
            self.rating_before,
        )?)
    }

    pub(crate) fn set_summary_id(&mut self, id: i64) {
        self.summary_id = Some(id);
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("player_id", &self.player_id)
            .field("mode", &self.mode)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("rating", &self.rating)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .field("summary_id", &self.summary_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::{BiasLevel, Category, Choice, QuestionDraft};
    use trivia_core::time::fixed_now;

    fn question(id: &str, difficulty: u8) -> Question {
        QuestionDraft {
            id: id.into(),
            number: 1,
            category: Category::RealData,
            bias: BiasLevel::Mid,
            difficulty,
            prompt: format!("Question {id}?"),
            choices: ["a", "b", "c"]
                .iter()
                .map(|c| Choice {
                    id: ChoiceId::new(*c),
                    text: (*c).to_uppercase(),
                })
                .collect(),
            correct: ChoiceId::new("a"),
            explanation: None,
        }
        .validate()
        .unwrap()
    }

    fn session(questions: Vec<Question>) -> QuizSession {
        QuizSession::new(
            PlayerId::new("local"),
            SessionMode::Standard,
            questions,
            1500,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::new(
            PlayerId::new("local"),
            SessionMode::Standard,
            Vec::new(),
            1500,
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn session_advances_updates_rating_and_completes() {
        let mut session = session(vec![question("q1", 3), question("q2", 3)]);

        let first = session
            .answer_current(&ChoiceId::new("a"), fixed_now())
            .unwrap();
        assert!(first.log.correct);
        assert_eq!(first.rating.delta, 10);
        assert_eq!(session.rating(), 1510);
        assert!(!session.is_complete());
        assert_eq!(session.progress().remaining, 1);

        let second = session
            .answer_current(&ChoiceId::new("b"), fixed_now())
            .unwrap();
        assert!(!second.log.correct);
        assert_eq!(second.correct_choice, ChoiceId::new("a"));
        assert_eq!(second.rating.new_rating, 1496);

        assert!(session.is_complete());
        assert_eq!(session.completed_at(), Some(fixed_now()));
        assert!(session.current_question().is_none());
        assert_eq!(session.rating_before(), 1500);
    }

    #[test]
    fn evaluating_an_answer_leaves_the_session_untouched() {
        let mut session = session(vec![question("q1", 3), question("q2", 3)]);
        let evaluated = session
            .evaluate_answer(&ChoiceId::new("a"), fixed_now())
            .unwrap();
        assert_eq!(evaluated.rating.new_rating, 1510);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.rating(), 1500);
        assert_eq!(session.current_question().unwrap().id().as_str(), "q1");

        let committed = session.commit_answer(evaluated.clone()).unwrap();
        assert_eq!(committed, &evaluated);
        assert_eq!(session.rating(), 1510);
        assert_eq!(session.current_question().unwrap().id().as_str(), "q2");
    }

    #[test]
    fn unknown_choice_does_not_advance() {
        let mut session = session(vec![question("q1", 2)]);
        let err = session
            .answer_current(&ChoiceId::new("z"), fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownChoice(c) if c.as_str() == "z"));
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.current_question().unwrap().id().as_str(), "q1");
    }

    #[test]
    fn answering_after_completion_fails() {
        let mut session = session(vec![question("q1", 2)]);
        session
            .answer_current(&ChoiceId::new("a"), fixed_now())
            .unwrap();
        let err = session
            .answer_current(&ChoiceId::new("a"), fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Completed));
    }

    #[test]
    fn summary_reflects_answers() {
        let mut session = session(vec![question("q1", 3), question("q2", 5)]);
        session
            .answer_current(&ChoiceId::new("a"), fixed_now())
            .unwrap();
        session
            .answer_current(&ChoiceId::new("a"), fixed_now())
            .unwrap();

        let summary = session.build_summary(fixed_now()).unwrap();
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.correct(), 2);
        // +10 then +19
        assert_eq!(summary.rating_after(), 1529);
        assert_eq!(summary.rating_after(), session.rating());
    }
}
