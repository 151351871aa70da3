//! Access to the generative-AI service that writes quiz content.
//!
//! The service is used through the [`Generator`] trait so request handlers can
//! run against [`GeminiClient`] in production and a scripted generator in
//! tests.

pub mod gemini;
pub mod prompt;
pub mod wikipedia;

#[cfg(test)]
pub(crate) mod scripted;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

pub use gemini::GeminiClient;

/// One piece of a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// A file previously uploaded with [`Generator::upload_document`].
    File { uri: String, mime_type: String },
}

#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub display_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to generation service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation service returned no text")]
    EmptyResponse,
    #[error("upload was not given an upload URL")]
    MissingUploadUrl,
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// A text-generation backend.
pub trait Generator: Send + Sync + 'static {
    /// Run one generation request and return the model's raw text.
    fn generate(&self, parts: Vec<Part>) -> impl Future<Output = Result<String, GenerationError>> + Send;

    /// Upload a document so later requests can reference it as a [`Part::File`].
    fn upload_document(
        &self,
        upload: DocumentUpload,
    ) -> impl Future<Output = Result<UploadedFile, GenerationError>> + Send;
}
