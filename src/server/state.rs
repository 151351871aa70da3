//! Server state management.
//!
//! One [`AppState`] is shared by every connection. The store sits behind an
//! async mutex; the generator and token issuer are used without locking.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::auth::{Claims, TokenIssuer};
use crate::error::ServiceError;
use crate::generation::{DocumentUpload, GenerationError, Generator, Part, UploadedFile};
use crate::store::Store;

pub struct AppState<G> {
    pub store: Mutex<Store>,
    pub tokens: TokenIssuer,
    generator: G,
    generation_timeout: Duration,
}

impl<G: Generator> AppState<G> {
    pub fn new(store: Store, tokens: TokenIssuer, generator: G, generation_timeout: Duration) -> Self {
        Self {
            store: Mutex::new(store),
            tokens,
            generator,
            generation_timeout,
        }
    }

    /// Resolve the caller from a request token.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Claims, ServiceError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Err(ServiceError::Unauthorized("Access token required".to_string()));
        };

        self.tokens.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "rejected session token");
            ServiceError::Forbidden("Invalid or expired token".to_string())
        })
    }

    /// Run one generation request, bounded by the configured timeout.
    pub async fn generate(&self, parts: Vec<Part>) -> Result<String, GenerationError> {
        self.bounded(self.generator.generate(parts)).await
    }

    pub async fn upload(&self, upload: DocumentUpload) -> Result<UploadedFile, GenerationError> {
        self.bounded(self.generator.upload_document(upload)).await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, GenerationError>>,
    ) -> Result<T, GenerationError> {
        tokio::time::timeout(self.generation_timeout, call)
            .await
            .map_err(|_| GenerationError::Timeout(self.generation_timeout))?
    }
}
