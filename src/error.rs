//! Errors returned to clients by the request handlers.

use thiserror::Error;

use crate::auth::AuthError;
use crate::protocol::ServerMessage;
use crate::store::StoreError;

const INTERNAL: &str = "Internal server error";

/// A failed request. Each variant maps to an HTTP-style status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthorized(_) => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Internal { .. } => 500,
        }
    }

    pub fn into_message(self) -> ServerMessage {
        let status = self.status();
        match self {
            ServiceError::Internal { message, details } => ServerMessage::Error {
                status,
                error: message,
                details,
            },
            ServiceError::BadRequest(error)
            | ServiceError::Unauthorized(error)
            | ServiceError::Forbidden(error)
            | ServiceError::NotFound(error) => ServerMessage::Error {
                status,
                error,
                details: None,
            },
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "store failure");
        ServiceError::internal(INTERNAL)
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        tracing::error!(error = %err, "credential failure");
        ServiceError::internal(INTERNAL)
    }
}
