use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ChoiceId, QuestionId};

/// Marquee names whose "obvious answer" questions are capped per session.
pub const FEATURED_ENTITIES: &[&str] = &[
    "Shohei Ohtani",
    "Aaron Judge",
    "Mike Trout",
    "Mookie Betts",
    "Juan Soto",
];

pub const MIN_CHOICES: usize = 3;
pub const MAX_CHOICES: usize = 4;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id must not be blank")]
    BlankId,

    #[error("question {id}: prompt must not be blank")]
    BlankPrompt { id: String },

    #[error("difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),

    #[error("question {id}: expected 3 or 4 choices, got {len}")]
    ChoiceCount { id: String, len: usize },

    #[error("question {id}: duplicate choice id {choice}")]
    DuplicateChoice { id: String, choice: String },

    #[error("question {id}: correct choice {choice} is not among the choices")]
    UnknownCorrectChoice { id: String, choice: String },
}

//
// ─── CLASSIFICATION ───────────────────────────────────────────────────────────
//

/// Sampling pool a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Questions answered from actual stat lines and records.
    RealData,
    /// Sabermetrics and strategy.
    Theory,
    /// Rules and general baseball knowledge.
    Knowledge,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::RealData, Category::Theory, Category::Knowledge];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::RealData => "REAL_DATA",
            Category::Theory => "THEORY",
            Category::Knowledge => "KNOWLEDGE",
        }
    }
}

/// How obvious the correct answer of a `RealData` question is.
///
/// `Top` is the most obvious ("the famous name is right"), `Low` the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasLevel {
    Top,
    Mid,
    #[default]
    Avg,
    Low,
}

impl BiasLevel {
    /// Round-robin order used by the session selector.
    pub const ALL: [BiasLevel; 4] = [BiasLevel::Top, BiasLevel::Mid, BiasLevel::Avg, BiasLevel::Low];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            BiasLevel::Top => 0,
            BiasLevel::Mid => 1,
            BiasLevel::Avg => 2,
            BiasLevel::Low => 3,
        }
    }
}

/// Question difficulty on a 1..=5 scale; only the rating update reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidDifficulty` outside 1..=5.
    pub fn new(value: u8) -> Result<Self, QuestionError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuestionError::InvalidDifficulty(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = QuestionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
}

/// Unvalidated question as it appears in catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: String,
    pub number: u32,
    pub category: Category,
    #[serde(default)]
    pub bias: BiasLevel,
    pub difficulty: u8,
    pub prompt: String,
    pub choices: Vec<Choice>,
    pub correct: ChoiceId,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// Bias levels on non-`RealData` questions are normalized to `Avg`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id or prompt is blank, the difficulty is out of
    /// range, the choice set has the wrong size or duplicate ids, or the correct
    /// choice is not part of the set.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = self.id.trim().to_owned();
        if id.is_empty() {
            return Err(QuestionError::BlankId);
        }

        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::BlankPrompt { id });
        }

        let difficulty = Difficulty::new(self.difficulty)?;

        let len = self.choices.len();
        if !(MIN_CHOICES..=MAX_CHOICES).contains(&len) {
            return Err(QuestionError::ChoiceCount { id, len });
        }

        for (i, choice) in self.choices.iter().enumerate() {
            if self.choices[..i].iter().any(|c| c.id == choice.id) {
                return Err(QuestionError::DuplicateChoice {
                    id,
                    choice: choice.id.to_string(),
                });
            }
        }

        if !self.choices.iter().any(|c| c.id == self.correct) {
            return Err(QuestionError::UnknownCorrectChoice {
                id,
                choice: self.correct.to_string(),
            });
        }

        let bias = if self.category == Category::RealData {
            self.bias
        } else {
            BiasLevel::Avg
        };

        Ok(Question {
            id: QuestionId::new(id),
            number: self.number,
            category: self.category,
            bias,
            difficulty,
            prompt,
            choices: self.choices,
            correct: self.correct,
            explanation: self.explanation.filter(|e| !e.trim().is_empty()),
        })
    }
}

/// Immutable question record loaded from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    number: u32,
    category: Category,
    bias: BiasLevel,
    difficulty: Difficulty,
    prompt: String,
    choices: Vec<Choice>,
    correct: ChoiceId,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn bias(&self) -> BiasLevel {
        self.bias
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn correct(&self) -> &ChoiceId {
        &self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn has_choice(&self, choice: &ChoiceId) -> bool {
        self.choices.iter().any(|c| &c.id == choice)
    }

    #[must_use]
    pub fn is_correct(&self, choice: &ChoiceId) -> bool {
        &self.correct == choice
    }

    /// True when the prompt mentions one of [`FEATURED_ENTITIES`].
    #[must_use]
    pub fn is_featured_entity(&self) -> bool {
        let prompt = self.prompt.to_lowercase();
        FEATURED_ENTITIES
            .iter()
            .any(|name| prompt.contains(&name.to_lowercase()))
    }

    /// Featured and `Top`: at most one of these per session.
    #[must_use]
    pub fn is_capped_pick(&self) -> bool {
        self.bias == BiasLevel::Top && self.is_featured_entity()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
