use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use tracing::{debug, instrument};

use super::types::AccessClaims;
use crate::config::AppConfig;
use crate::shared::AppError;
use crate::users::SafeUser;

/// Entropy of a freshly drawn refresh secret, in bytes
const REFRESH_SECRET_BYTES: usize = 32;

/// Configuration for token issuance, built once from [`AppConfig`]
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: String, access_token_ttl: Duration, refresh_token_ttl: Duration) -> Self {
        Self {
            secret,
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret.clone(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    /// Mints a short-lived signed access token carrying the user's claims
    #[instrument(skip(self, user))]
    pub fn issue_access_token(&self, user: &SafeUser) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + self.access_token_ttl).timestamp() as usize;

        let claims = AccessClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode access token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates an access token's signature and expiry, returning the claims
    #[instrument(skip(self, token))]
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode access token");
            AppError::Unauthorized("Invalid access token".to_string())
        })
    }
}

/// Draws a fresh refresh-token secret from the OS-seeded CSPRNG
pub fn generate_refresh_secret() -> String {
    let mut bytes = [0u8; REFRESH_SECRET_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The two halves of an external refresh token. The id is a lookup key,
/// the secret is the actual bearer credential. The delimited string form
/// exists only at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenParts {
    pub id: i64,
    pub secret: String,
}

impl RefreshTokenParts {
    pub fn new(id: i64, secret: String) -> Self {
        Self { id, secret }
    }

    /// Parses `"<id>.<secret>"` under a strict grammar: exactly two
    /// non-empty dot-separated segments, the first a positive integer.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let segments: Vec<&str> = raw.split('.').collect();
        let [id_part, secret_part] = segments.as_slice() else {
            debug!("Refresh token does not have exactly two segments");
            return Err(AppError::Unauthorized("Invalid refresh token".to_string()));
        };

        if id_part.is_empty() || secret_part.is_empty() {
            debug!("Refresh token has an empty segment");
            return Err(AppError::Unauthorized("Invalid refresh token".to_string()));
        }

        let id: i64 = id_part.parse().map_err(|_| {
            debug!("Refresh token id segment is not numeric");
            AppError::Unauthorized("Invalid refresh token".to_string())
        })?;

        if id <= 0 {
            debug!("Refresh token id segment is not positive");
            return Err(AppError::Unauthorized("Invalid refresh token".to_string()));
        }

        Ok(Self {
            id,
            secret: secret_part.to_string(),
        })
    }

    /// Serializes back to the external `"<id>.<secret>"` form
    pub fn compose(&self) -> String {
        format!("{}.{}", self.id, self.secret)
    }
}
