use chrono::NaiveDate;
use rand::Rng;
use std::collections::HashSet;

use trivia_core::Catalog;
use trivia_core::daily::{DAILY_SIZE, select_daily};
use trivia_core::model::{Question, QuestionId, SessionMode};
use trivia_core::selector::{Composition, SESSION_SIZE, SelectionOptions, select_session};

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    pub mode: SessionMode,
    /// Category mix; `None` for the daily challenge.
    pub composition: Option<Composition>,
    pub used_fallback: bool,
    pub requested: usize,
}

impl SessionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Fewer questions than requested: the catalog lacks content for this mode.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.questions.len() < self.requested
    }
}

/// Builds a session plan for one of the session modes.
pub struct SessionPlanner<'a> {
    catalog: &'a Catalog,
    mode: SessionMode,
    excluded: HashSet<QuestionId>,
}

impl<'a> SessionPlanner<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, mode: SessionMode) -> Self {
        Self {
            catalog,
            mode,
            excluded: HashSet::new(),
        }
    }

    /// Questions to avoid; ignored by the daily challenge.
    #[must_use]
    pub fn with_excluded(mut self, excluded: HashSet<QuestionId>) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn build<R: Rng + ?Sized>(self, today: NaiveDate, rng: &mut R) -> SessionPlan {
        match self.mode {
            SessionMode::Daily => SessionPlan {
                questions: select_daily(self.catalog.questions(), today, DAILY_SIZE, None),
                mode: self.mode,
                composition: None,
                used_fallback: false,
                requested: DAILY_SIZE,
            },
            SessionMode::Standard | SessionMode::DataOnly => {
                let options = SelectionOptions {
                    data_only: self.mode == SessionMode::DataOnly,
                    excluded: self.excluded,
                };
                let selection = select_session(self.catalog.questions(), &options, rng);
                SessionPlan {
                    questions: selection.questions,
                    mode: self.mode,
                    composition: Some(selection.composition),
                    used_fallback: selection.used_fallback,
                    requested: SESSION_SIZE,
                }
            }
        }
    }
}

/// Convenience wrapper around [`SessionPlanner`].
pub fn plan_session<R: Rng + ?Sized>(
    catalog: &Catalog,
    mode: SessionMode,
    excluded: HashSet<QuestionId>,
    today: NaiveDate,
    rng: &mut R,
) -> SessionPlan {
    SessionPlanner::new(catalog, mode)
        .with_excluded(excluded)
        .build(today, rng)
}
