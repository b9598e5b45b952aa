//! Immutable question catalog.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use thiserror::Error;

use crate::model::{Category, Question, QuestionDraft, QuestionError, QuestionId};

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    #[error("invalid question at index {index}: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The full question pool, read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
}

impl Catalog {
    /// Build a catalog from validated questions.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two questions share an identifier.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(questions.len());
        for (i, q) in questions.iter().enumerate() {
            if index.insert(q.id().clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(q.id().clone()));
            }
        }
        Ok(Self { questions, index })
    }

    /// Validate drafts and build a catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidQuestion` for the first draft that fails
    /// validation, or `CatalogError::DuplicateId`.
    pub fn from_drafts(drafts: Vec<QuestionDraft>) -> Result<Self, CatalogError> {
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| CatalogError::InvalidQuestion { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// Parse a JSON array of question drafts.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON, otherwise as [`Catalog::from_drafts`].
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let drafts: Vec<QuestionDraft> = serde_json::from_str(json)?;
        Self::from_drafts(drafts)
    }

    /// # Errors
    ///
    /// As [`Catalog::from_json_str`].
    pub fn from_json_reader(reader: impl Read) -> Result<Self, CatalogError> {
        let drafts: Vec<QuestionDraft> = serde_json::from_reader(reader)?;
        Self::from_drafts(drafts)
    }

    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded data is broken, which the tests guard against.
    pub fn sample() -> Result<Self, CatalogError> {
        Self::from_json_str(SAMPLE_CATALOG)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| q.category() == category)
    }

    #[must_use]
    pub fn ids(&self) -> HashSet<QuestionId> {
        self.index.keys().cloned().collect()
    }
}
