use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::question::QuizQuestion;
use super::user::Creator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Cycle to the next level, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored quiz. Only accepted questions are ever saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub name: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub questions: Vec<QuizQuestion>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Quiz {
    pub fn detail(&self, creator: Option<Creator>) -> QuizDetail {
        QuizDetail {
            id: self.id,
            name: self.name.clone(),
            topic: self.topic.clone(),
            difficulty: self.difficulty,
            question_count: self.question_count,
            questions: self.questions.clone(),
            created_by: creator,
            created_at: self.created_at,
            is_active: self.is_active,
        }
    }

    pub fn summary(&self, creator: Option<Creator>) -> QuizSummary {
        QuizSummary {
            id: self.id,
            name: self.name.clone(),
            topic: self.topic.clone(),
            difficulty: self.difficulty,
            question_count: self.question_count,
            created_by: creator,
            created_at: self.created_at,
        }
    }
}

/// A quiz with its questions and resolved author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDetail {
    pub id: Uuid,
    pub name: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub questions: Vec<QuizQuestion>,
    pub created_by: Option<Creator>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Listing entry for the public quiz catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: Uuid,
    pub name: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub created_by: Option<Creator>,
    pub created_at: DateTime<Utc>,
}
