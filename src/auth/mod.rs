//! Credentials and session tokens.

mod password;
mod token;
mod validate;

use thiserror::Error;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer, DEFAULT_TOKEN_TTL_HOURS};
pub use validate::{all_present, validate_new_password};

/// Minimum length for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
