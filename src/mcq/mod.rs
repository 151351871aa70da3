//! Normalization of generative-model output into multiple-choice questions.
//!
//! Model output arrives as free text that is supposed to hold a JSON array of
//! `["question", ["a", "b", "c", "d"], correctIndex]` triples. It is processed
//! in two stages:
//!
//! 1. [`extract_json`] finds a JSON value in the text, tolerating prose and
//!    markdown fences around it.
//! 2. [`validate_mcq_array`] checks every element against the triple shape.
//!
//! Any violation fails the whole batch with [`MalformedResponse`]; a partially
//! valid sequence is never returned.

mod extract;
pub mod topics;
mod validate;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use extract::extract_json;
pub use validate::validate_mcq_array;

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A question that passed validation.
///
/// Candidates can only be built by the validator, so `correct_index` always
/// points into `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqCandidate {
    question: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
}

impl McqCandidate {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Resolve the correct index into the literal option text.
    ///
    /// The index is dropped afterwards: downstream code only ever compares
    /// answers by text.
    pub fn resolve(self) -> GeneratedQuestion {
        let correct_answer = self.options[self.correct_index].clone();
        GeneratedQuestion {
            question: self.question,
            options: self.options,
            correct_answer,
        }
    }
}

/// A generated question as handed to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: String,
}

/// The constraint a model response failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("no valid JSON found in response")]
    NoJson,
    #[error("response is not an array")]
    NotAnArray,
    #[error("element {index}: expected [question, options, correctIndex]")]
    ItemNotArray { index: usize },
    #[error("element {index}: expected 3 items, found {len}")]
    ItemArity { index: usize, len: usize },
    #[error("element {index}: question must be a string")]
    QuestionNotString { index: usize },
    #[error("element {index}: question is empty")]
    EmptyQuestion { index: usize },
    #[error("element {index}: options must be an array of 4 strings")]
    OptionsNotArray { index: usize },
    #[error("element {index}: expected 4 options, found {len}")]
    OptionCount { index: usize, len: usize },
    #[error("element {index}: option {option} must be a string")]
    OptionNotString { index: usize, option: usize },
    #[error("element {index}: option {option} is empty")]
    EmptyOption { index: usize, option: usize },
    #[error("element {index}: correct index must be a number")]
    IndexNotNumber { index: usize },
    #[error("element {index}: correct index must be an integer")]
    IndexNotInteger { index: usize },
    #[error("element {index}: correct index must be between 0 and 3, got {value}")]
    IndexOutOfRange { index: usize, value: String },
}

/// Raised for every parse or validation failure.
///
/// Carries the untouched model output so failures can be diagnosed from logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed model response: {violation}")]
pub struct MalformedResponse {
    pub violation: Violation,
    pub raw: String,
}

impl MalformedResponse {
    pub(crate) fn new(violation: Violation, raw: &str) -> Self {
        Self {
            violation,
            raw: raw.to_string(),
        }
    }
}

/// Extract and validate the questions held in raw model output.
pub fn normalize(text: &str) -> Result<Vec<McqCandidate>, MalformedResponse> {
    let value = extract_json(text)?;
    validate_mcq_array(&value, text)
}

/// Normalize and resolve every candidate to its answer text.
pub fn normalize_resolved(text: &str) -> Result<Vec<GeneratedQuestion>, MalformedResponse> {
    Ok(normalize(text)?
        .into_iter()
        .map(McqCandidate::resolve)
        .collect())
}
