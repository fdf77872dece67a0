use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::models::NewRefreshToken;
use super::password;
use super::repository::{RefreshTokenRepository, RevokeOutcome};
use super::token::{generate_refresh_secret, RefreshTokenParts, TokenConfig};
use super::types::{AccessClaims, SessionTokens};
use crate::shared::AppError;
use crate::users::{SafeUser, UsersService};

/// Single message for every refresh failure. The concrete reason
/// (absent, revoked, expired, bad secret, deleted user) goes to the logs
/// only, so responses never reveal which check tripped.
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Same idea for credential failures: unknown email and wrong password
/// are indistinguishable to the caller.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Service orchestrating the session lifecycle: credential verification,
/// token issuance, single-use refresh rotation and logout.
pub struct AuthService {
    users: Arc<UsersService>,
    refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<UsersService>,
        refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            token_config,
        }
    }

    /// Checks a plaintext password against the stored hash. Unknown email
    /// and wrong password both come back as `None`.
    #[instrument(skip(self, plaintext_password))]
    pub async fn verify_credentials(
        &self,
        email: &str,
        plaintext_password: &str,
    ) -> Result<Option<SafeUser>, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!(email = %email, "Login attempt for unknown email");
            return Ok(None);
        };

        if !password::verify(plaintext_password, &user.password_hash) {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Ok(None);
        }

        Ok(Some(user.into_safe()))
    }

    /// Verifies credentials and issues a fresh session pair
    #[instrument(skip(self, plaintext_password))]
    pub async fn login(
        &self,
        email: &str,
        plaintext_password: &str,
    ) -> Result<SessionTokens, AppError> {
        let user = self
            .verify_credentials(email, plaintext_password)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        info!(user_id = user.id, "Login successful");
        self.issue_session(&user).await
    }

    /// Creates the account (conflict if the email is taken) and issues the
    /// same session pair a login would
    #[instrument(skip(self, plaintext_password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        plaintext_password: &str,
    ) -> Result<SessionTokens, AppError> {
        let user = self.users.create(username, email, plaintext_password).await?;

        info!(user_id = user.id, "Registration successful");
        self.issue_session(&user).await
    }

    /// Exchanges a valid refresh token for a new session pair, rotating
    /// the token: the consumed record is revoked before anything new is
    /// issued, so a partial failure can never leave it replayable.
    ///
    /// Checks run in a fixed order so the first applicable failure is the
    /// one logged: grammar, existence, revoked flag, expiry, secret match.
    #[instrument(skip(self, raw_token))]
    pub async fn refresh(&self, raw_token: &str) -> Result<SessionTokens, AppError> {
        let parts = RefreshTokenParts::parse(raw_token)?;

        let record = self
            .refresh_tokens
            .find_by_id(parts.id)
            .await?
            .ok_or_else(|| {
                warn!(token_id = parts.id, "Refresh token record not found");
                AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
            })?;

        if record.revoked {
            warn!(token_id = record.id, "Refresh attempt with revoked token");
            return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
        }

        if record.is_expired() {
            warn!(token_id = record.id, "Refresh attempt with expired token");
            return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
        }

        if !password::verify(&parts.secret, &record.token_hash) {
            warn!(token_id = record.id, "Refresh token secret mismatch");
            return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
        }

        // Revoke-before-reissue. The compare-and-set also settles
        // concurrent refreshes of the same token: only one caller gets
        // Revoked, everyone else fails here.
        match self.refresh_tokens.revoke(record.id).await? {
            RevokeOutcome::Revoked(_) => {}
            RevokeOutcome::AlreadyRevoked(_) | RevokeOutcome::NotFound => {
                warn!(token_id = record.id, "Lost refresh race, token already consumed");
                return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
            }
        }

        // Re-read the account so the new access token carries fresh claims
        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = record.user_id, "Refresh for a deleted user");
                AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
            })?
            .into_safe();

        info!(user_id = user.id, consumed_token_id = record.id, "Refresh token rotated");
        self.issue_session(&user).await
    }

    /// Best-effort logout. Malformed or unknown tokens are treated as
    /// success-by-no-op; only infrastructure failures propagate.
    #[instrument(skip(self, raw_token))]
    pub async fn logout(&self, raw_token: &str) -> Result<(), AppError> {
        let Ok(parts) = RefreshTokenParts::parse(raw_token) else {
            info!("Logout with malformed token, treating as no-op");
            return Ok(());
        };

        match self.refresh_tokens.revoke(parts.id).await? {
            RevokeOutcome::Revoked(token) => {
                info!(token_id = token.id, user_id = token.user_id, "Logged out");
            }
            RevokeOutcome::AlreadyRevoked(_) | RevokeOutcome::NotFound => {
                info!(token_id = parts.id, "Logout for an already-invalid token, no-op");
            }
        }

        Ok(())
    }

    /// Validates an access token's signature and expiry
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.token_config.validate_access_token(token)
    }

    /// Deletes expired refresh-token rows; run by the background sweep
    #[instrument(skip(self))]
    pub async fn remove_expired_tokens(&self) -> Result<u64, AppError> {
        self.refresh_tokens.remove_expired().await
    }

    /// Issues one access token and one persisted refresh token
    async fn issue_session(&self, user: &SafeUser) -> Result<SessionTokens, AppError> {
        let access_token = self.token_config.issue_access_token(user)?;

        let secret = generate_refresh_secret();
        let record = self
            .refresh_tokens
            .create(&NewRefreshToken {
                user_id: user.id,
                token_hash: password::hash_refresh_secret(&secret)?,
                expires_at: Utc::now() + self.token_config.refresh_token_ttl,
            })
            .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token: RefreshTokenParts::new(record.id, secret).compose(),
        })
    }
}
