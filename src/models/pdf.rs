use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mcq::topics::Topic;

/// A document uploaded to the generation service, kept so later requests can
/// reference it without uploading again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfDocument {
    pub id: Uuid,
    pub original_name: String,
    /// URI the generation service uses to reference the uploaded file.
    pub file_uri: String,
    /// Service-side resource name of the uploaded file.
    pub file_name: String,
    pub mime_type: String,
    pub topics: Vec<Topic>,
    pub created_at: DateTime<Utc>,
}
