use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recorded as the selection for questions left blank when a quiz ends.
pub const NOT_ANSWERED: &str = "Not answered";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question: String,
    pub selected: String,
    pub correct: String,
    pub is_correct: bool,
}

/// One finished attempt at a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestHistory {
    pub id: Uuid,
    pub user: Uuid,
    pub quiz_id: String,
    pub quiz_name: String,
    pub date: DateTime<Utc>,
    pub score: u32,
    pub total: u32,
    pub topic: String,
    pub difficulty: String,
    #[serde(default)]
    pub answers: Vec<AnswerRecord>,
}
