use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("choice questions need at least one option")]
    NoOptions,

    #[error("free-text questions cannot carry options")]
    UnexpectedOptions,

    #[error("option text cannot be empty")]
    EmptyOption,

    #[error("unknown question kind: {0}")]
    UnknownKind(String),
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// How a question is answered.
///
/// Wire names match the backend (`single`, `multiple`, `text`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    FreeText,
}

impl QuestionKind {
    /// Returns the backend wire name for this kind.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "single",
            QuestionKind::MultipleChoice => "multiple",
            QuestionKind::FreeText => "text",
        }
    }

    /// Returns true for kinds answered by picking from options.
    #[must_use]
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionKind::SingleChoice | QuestionKind::MultipleChoice
        )
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for QuestionKind {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(QuestionKind::SingleChoice),
            "multiple" => Ok(QuestionKind::MultipleChoice),
            "text" => Ok(QuestionKind::FreeText),
            other => Err(QuestionError::UnknownKind(other.to_string())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single question inside a test.
///
/// The correct answer, when present, is an opaque backend payload. It is
/// never evaluated client-side; scoring belongs to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    kind: QuestionKind,
    options: Vec<String>,
    correct_answer: Option<String>,
}

impl Question {
    /// Creates a new question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` if the text is empty or
    /// whitespace-only, `QuestionError::NoOptions` when a choice kind has no
    /// options, `QuestionError::UnexpectedOptions` when a free-text question
    /// carries options, and `QuestionError::EmptyOption` for a blank option.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        kind: QuestionKind,
        options: Vec<String>,
        correct_answer: Option<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }

        if kind.has_options() {
            if options.is_empty() {
                return Err(QuestionError::NoOptions);
            }
            if options.iter().any(|opt| opt.trim().is_empty()) {
                return Err(QuestionError::EmptyOption);
            }
        } else if !options.is_empty() {
            return Err(QuestionError::UnexpectedOptions);
        }

        Ok(Self {
            id,
            text: text.trim().to_owned(),
            kind,
            options,
            correct_answer,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Option labels in display order. Empty for free-text questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
