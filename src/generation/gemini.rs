//! Gemini REST client.

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{DocumentUpload, GenerationError, Generator, Part, UploadedFile};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Generator for GeminiClient {
    async fn generate(&self, parts: Vec<Part>) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: parts.into_iter().map(RequestPart::from).collect(),
            }],
        };

        tracing::debug!(model = %self.model, "sending generateContent request");
        let response = self
            .http
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;
        let response: GenerateResponse = check_status(response).await?.json().await?;

        response_text(response).ok_or(GenerationError::EmptyResponse)
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadedFile, GenerationError> {
        let start = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .query(&[("key", &self.api_key)])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", upload.bytes.len())
            .header("X-Goog-Upload-Header-Content-Type", upload.mime_type.as_str())
            .json(&json!({ "file": { "displayName": upload.display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .ok_or(GenerationError::MissingUploadUrl)?
            .to_string();

        let size = upload.bytes.len();
        let finished = self
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Offset", 0)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(upload.bytes)
            .send()
            .await?;
        let finished: UploadResponse = check_status(finished).await?.json().await?;

        tracing::info!(
            name = %finished.file.name,
            bytes = size,
            "document uploaded to generation service"
        );
        Ok(UploadedFile {
            name: finished.file.name,
            uri: finished.file.uri,
            mime_type: finished.file.mime_type.unwrap_or(upload.mime_type),
        })
    }
}

async fn check_status(response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GenerationError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Concatenated text of the first candidate, if it has any.
fn response_text(response: GenerateResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    (!text.is_empty()).then_some(text)
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart {
    Text(String),
    FileData {
        #[serde(rename = "mimeType")]
        mime_type: String,
        #[serde(rename = "fileUri")]
        file_uri: String,
    },
}

impl From<Part> for RequestPart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(text) => RequestPart::Text(text),
            Part::File { uri, mime_type } => RequestPart::FileData {
                mime_type,
                file_uri: uri,
            },
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: String,
    uri: String,
    mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_part_shape() {
        let parts = vec![
            RequestPart::from(Part::File {
                uri: "https://files/abc".to_string(),
                mime_type: "application/pdf".to_string(),
            }),
            RequestPart::from(Part::Text("hello".to_string())),
        ];
        let json = serde_json::to_value(&parts).unwrap();
        assert_eq!(
            json,
            json!([
                { "fileData": { "mimeType": "application/pdf", "fileUri": "https://files/abc" } },
                { "text": "hello" }
            ])
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "[[\"q\"," }, { "text": "...]]" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response_text(response).as_deref(), Some("[[\"q\",...]]"));
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert!(response_text(response).is_none());
    }
}
