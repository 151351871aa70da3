use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Role, User};

use super::AuthError;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            name: user.display_name(),
            email: user.email.clone(),
            created_at: user.created_at,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Decode a token, rejecting bad signatures and expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
