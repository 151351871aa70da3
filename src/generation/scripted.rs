//! In-process generator that replays canned replies.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{DocumentUpload, GenerationError, Generator, Part, UploadedFile};

#[derive(Default)]
pub(crate) struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Part>>>,
    uploads: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub(crate) fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(["[]"])
        }
    }

    pub(crate) fn requests(&self) -> Vec<Vec<Part>> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Generator for ScriptedGenerator {
    async fn generate(&self, parts: Vec<Part>) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(parts);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(GenerationError::EmptyResponse)
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<UploadedFile, GenerationError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(upload.display_name);
        Ok(UploadedFile {
            name: format!("files/{}", uploads.len()),
            uri: format!("https://files.test/{}", uploads.len()),
            mime_type: upload.mime_type,
        })
    }
}
