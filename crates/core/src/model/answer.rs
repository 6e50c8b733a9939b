use std::collections::HashMap;

use crate::model::ids::QuestionId;

//
// ─── ANSWER VALUE ──────────────────────────────────────────────────────────────
//

/// The user's current answer to one question.
///
/// Choice indices are 1-based, matching the backend wire format: a single
/// choice encodes as `"2"`, a multiple choice as comma-joined indices
/// (`"1,3"`), free text as the raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// 1-based index of the selected option.
    Choice(usize),
    /// Sorted, deduplicated 1-based indices of the selected options.
    Choices(Vec<usize>),
    /// Free-text answer, stored as typed.
    Text(String),
}

impl AnswerValue {
    /// Single-choice answer for a 1-based option index.
    #[must_use]
    pub fn choice(option: usize) -> Self {
        Self::Choice(option)
    }

    /// Free-text answer.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Multiple-choice answer; indices are sorted and deduplicated.
    #[must_use]
    pub fn choices(mut options: Vec<usize>) -> Self {
        options.sort_unstable();
        options.dedup();
        Self::Choices(options)
    }

    /// Encodes the answer in the backend wire format.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            AnswerValue::Choice(option) => option.to_string(),
            AnswerValue::Choices(options) => {
                let parts: Vec<String> = options.iter().map(ToString::to_string).collect();
                parts.join(",")
            }
            AnswerValue::Text(value) => value.clone(),
        }
    }

    /// Returns true when the given 1-based option index is selected.
    ///
    /// Always false for free-text answers.
    #[must_use]
    pub fn selects(&self, option: usize) -> bool {
        match self {
            AnswerValue::Choice(selected) => *selected == option,
            AnswerValue::Choices(selected) => selected.contains(&option),
            AnswerValue::Text(_) => false,
        }
    }

    /// Returns the selected set with the given 1-based index toggled.
    ///
    /// Starts from the current selection when this is already a
    /// `Choices` value, otherwise from an empty set.
    #[must_use]
    pub fn toggled(&self, option: usize) -> Vec<usize> {
        let mut selected = match self {
            AnswerValue::Choices(options) => options.clone(),
            _ => Vec::new(),
        };
        if let Some(pos) = selected.iter().position(|&o| o == option) {
            selected.remove(pos);
        } else {
            selected.push(option);
            selected.sort_unstable();
        }
        selected
    }
}

//
// ─── ANSWER BUFFER ─────────────────────────────────────────────────────────────
//

/// Client-local mapping of question to current answer value.
///
/// Keyed uniquely per question; writing an answer overwrites the prior
/// value. Mutated only by the active session and cleared when it ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerBuffer {
    answers: HashMap<QuestionId, AnswerValue>,
}

impl AnswerBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an answer. Last write wins; there are no append semantics.
    pub fn set(&mut self, question_id: QuestionId, value: AnswerValue) {
        self.answers.insert(question_id, value);
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(&question_id)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.answers.contains_key(&question_id)
    }

    /// Removes the answer for a question, if any.
    pub fn remove(&mut self, question_id: QuestionId) {
        self.answers.remove(&question_id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Drops every stored answer.
    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
