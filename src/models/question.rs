use serde::{Deserialize, Serialize};

use crate::mcq::{GeneratedQuestion, OPTION_COUNT};

/// Review state of a question inside a quiz draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: String,
    #[serde(default)]
    pub status: QuestionStatus,
}

impl QuizQuestion {
    pub fn is_accepted(&self) -> bool {
        self.status == QuestionStatus::Accepted
    }

    /// Position of the correct answer among the options, if it is one of them.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }
}

impl From<GeneratedQuestion> for QuizQuestion {
    fn from(generated: GeneratedQuestion) -> Self {
        Self {
            question: generated.question,
            options: generated.options,
            correct_answer: generated.correct_answer,
            status: QuestionStatus::Pending,
        }
    }
}
