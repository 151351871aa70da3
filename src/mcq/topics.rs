//! Lenient parsing of the topic list a model extracts from a document.
//!
//! Unlike question batches, topic lists never fail: anything unusable
//! collapses to a single whole-document topic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract_json;

pub const FALLBACK_TOPIC_ID: &str = "Entire Document";
pub const FALLBACK_TOPIC_TITLE: &str = "Entire PDF Content";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Short phrase taken from the document, used as the generation key.
    pub id: String,
    pub title: String,
}

impl Topic {
    pub fn fallback() -> Self {
        Self {
            id: FALLBACK_TOPIC_ID.to_string(),
            title: FALLBACK_TOPIC_TITLE.to_string(),
        }
    }
}

/// Parse a model's topic list, falling back to [`Topic::fallback`].
pub fn parse_topics(text: &str) -> Vec<Topic> {
    let parsed = match extract_json(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "could not parse topic list");
            return vec![Topic::fallback()];
        }
    };

    let topics: Vec<Topic> = parsed
        .as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| topic_from_value(index, item))
                .collect()
        })
        .unwrap_or_default();

    if topics.is_empty() {
        vec![Topic::fallback()]
    } else {
        topics
    }
}

fn topic_from_value(index: usize, value: &Value) -> Topic {
    let placeholder = || format!("Topic {}", index + 1);

    let (id, title) = match value {
        Value::Object(fields) => (trimmed_str(fields.get("id")), trimmed_str(fields.get("title"))),
        Value::String(text) => (text.trim().to_string(), text.trim().to_string()),
        Value::Number(_) | Value::Bool(_) => (value.to_string(), value.to_string()),
        Value::Null | Value::Array(_) => (String::new(), String::new()),
    };

    let title = match (title.is_empty(), id.is_empty()) {
        (false, _) => title,
        (true, false) => id.clone(),
        (true, true) => placeholder(),
    };
    let id = if id.is_empty() { placeholder() } else { id };

    Topic { id, title }
}

fn trimmed_str(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
