//! Bearer token issuance and verification.
//!
//! Tokens are compact HS256 JWTs: URL-safe, unpadded base64 header and payload,
//! signed with HMAC-SHA256 over `header.payload`. The payload carries the
//! account identity plus `iat`/`exp`.

pub mod password;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::database::models::Role;

/// Authenticated identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: i64,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),

    /// Malformed, forged and expired tokens all land here.
    #[error("Invalid or expired token")]
    Invalid,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("validity_secs", &self.validity_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Refuses to construct without a secret; there is no fallback key.
    pub fn new(secret: Option<&str>, validity_secs: i64) -> Result<Self, TokenError> {
        let secret = secret
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingSecret)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity_secs,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TokenError> {
        Self::new(config.jwt_secret(), config.security.jwt_expiry_secs)
    }

    pub fn validity_secs(&self) -> i64 {
        self.validity_secs
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    pub fn issue_at(&self, identity: &Identity, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: identity.account_id,
            email: identity.email.clone(),
            role: identity.role,
            iat: now,
            exp: now + self.validity_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token against the clock value `now` (unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Identity, TokenError> {
        if token.split('.').count() != 3 {
            tracing::debug!("token rejected: expected three segments");
            return Err(TokenError::Invalid);
        }

        // Expiry is checked below against `now` with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("token rejected: {}", e);
                TokenError::Invalid
            })?
            .claims;

        if claims.exp <= now {
            tracing::debug!("token rejected: expired at {}", claims.exp);
            return Err(TokenError::Invalid);
        }

        Ok(claims.into())
    }
}
