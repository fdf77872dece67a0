use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewRefreshToken, RefreshTokenModel};
use crate::shared::AppError;

/// Result of attempting to revoke a refresh token.
///
/// The revoke is a compare-and-set on the `revoked` flag, so concurrent
/// refreshes of the same token resolve to exactly one `Revoked` winner;
/// every loser observes `AlreadyRevoked`. All outcomes leave the row
/// revoked, which keeps the operation idempotent for logout.
#[derive(Debug, Clone)]
pub enum RevokeOutcome {
    /// This caller flipped the flag
    Revoked(RefreshTokenModel),
    /// The flag was already set by an earlier caller
    AlreadyRevoked(RefreshTokenModel),
    /// No record with that id exists
    NotFound,
}

/// Trait for refresh-token storage operations
#[async_trait]
pub trait RefreshTokenRepository {
    async fn create(&self, token: &NewRefreshToken) -> Result<RefreshTokenModel, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshTokenModel>, AppError>;

    /// Atomically sets `revoked = true`, reporting whether this caller won
    async fn revoke(&self, id: i64) -> Result<RevokeOutcome, AppError>;

    /// Revokes every currently-unrevoked token owned by the user.
    /// Available for a "log out everywhere" flow; no session flow calls
    /// it today.
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError>;

    /// Deletes rows past their expiry. Maintenance sweep only, never part
    /// of the request path.
    async fn remove_expired(&self) -> Result<u64, AppError>;
}

/// In-memory implementation of RefreshTokenRepository for development and
/// testing. Data is lost when the process exits.
pub struct InMemoryRefreshTokenRepository {
    tokens: Mutex<HashMap<i64, RefreshTokenModel>>,
    next_id: AtomicI64,
}

impl Default for InMemoryRefreshTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Returns the current number of token records
    pub fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    #[instrument(skip(self, token))]
    async fn create(&self, token: &NewRefreshToken) -> Result<RefreshTokenModel, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let model = RefreshTokenModel {
            id,
            user_id: token.user_id,
            token_hash: token.token_hash.clone(),
            expires_at: token.expires_at,
            revoked: false,
            created_at: Utc::now(),
        };
        tokens.insert(id, model.clone());

        debug!(token_id = id, user_id = token.user_id, "Refresh token created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshTokenModel>, AppError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn revoke(&self, id: i64) -> Result<RevokeOutcome, AppError> {
        let mut tokens = self.tokens.lock().unwrap();

        match tokens.get_mut(&id) {
            Some(token) if !token.revoked => {
                token.revoked = true;
                debug!(token_id = id, "Refresh token revoked in memory");
                Ok(RevokeOutcome::Revoked(token.clone()))
            }
            Some(token) => {
                debug!(token_id = id, "Refresh token was already revoked");
                Ok(RevokeOutcome::AlreadyRevoked(token.clone()))
            }
            None => {
                debug!(token_id = id, "Refresh token not found for revoke");
                Ok(RevokeOutcome::NotFound)
            }
        }
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let mut revoked_count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.revoked {
                token.revoked = true;
                revoked_count += 1;
            }
        }

        debug!(
            user_id = user_id,
            revoked_count = revoked_count,
            "Bulk-revoked refresh tokens in memory"
        );
        Ok(revoked_count)
    }

    #[instrument(skip(self))]
    async fn remove_expired(&self) -> Result<u64, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let now = Utc::now();
        let initial_count = tokens.len();

        tokens.retain(|_, token| token.expires_at > now);

        let removed_count = (initial_count - tokens.len()) as u64;
        debug!(
            expired_tokens_removed = removed_count,
            "Expired refresh tokens removed from memory"
        );
        Ok(removed_count)
    }
}

/// PostgreSQL implementation of refresh-token repository
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_model(row: &sqlx::postgres::PgRow) -> RefreshTokenModel {
        RefreshTokenModel {
            id: row.get("id"),
            user_id: row.get("user_id"),
            token_hash: row.get("token_hash"),
            expires_at: row.get("expires_at"),
            revoked: row.get("revoked"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    #[instrument(skip(self, token))]
    async fn create(&self, token: &NewRefreshToken) -> Result<RefreshTokenModel, AppError> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at, revoked, created_at) \
             VALUES ($1, $2, $3, false, $4) RETURNING id",
        )
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create refresh token in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(RefreshTokenModel {
            id: row.get("id"),
            user_id: token.user_id,
            token_hash: token.token_hash.clone(),
            expires_at: token.expires_at,
            revoked: false,
            created_at: now,
        })
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshTokenModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, token_hash, expires_at, revoked, created_at \
             FROM refresh_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, token_id = id, "Failed to fetch refresh token from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(Self::row_to_model))
    }

    #[instrument(skip(self))]
    async fn revoke(&self, id: i64) -> Result<RevokeOutcome, AppError> {
        // Compare-and-set: only the first caller flips the flag
        let updated = sqlx::query(
            "UPDATE refresh_tokens SET revoked = true \
             WHERE id = $1 AND revoked = false \
             RETURNING id, user_id, token_hash, expires_at, revoked, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, token_id = id, "Failed to revoke refresh token");
            AppError::DatabaseError(e.to_string())
        })?;

        if let Some(row) = updated {
            debug!(token_id = id, "Refresh token revoked");
            return Ok(RevokeOutcome::Revoked(Self::row_to_model(&row)));
        }

        // Lost the race or never existed
        match self.find_by_id(id).await? {
            Some(token) => {
                debug!(token_id = id, "Refresh token was already revoked");
                Ok(RevokeOutcome::AlreadyRevoked(token))
            }
            None => Ok(RevokeOutcome::NotFound),
        }
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = true WHERE user_id = $1 AND revoked = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = user_id, "Failed to bulk-revoke refresh tokens");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(
            user_id = user_id,
            revoked_count = result.rows_affected(),
            "Bulk-revoked refresh tokens"
        );
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn remove_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to remove expired refresh tokens");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!(
            expired_tokens_removed = result.rows_affected(),
            "Expired refresh tokens removed"
        );
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use chrono::Duration;

    fn new_token(user_id: i64, ttl: Duration) -> NewRefreshToken {
        NewRefreshToken {
            user_id,
            token_hash: "hash".to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_token() {
        let repo = InMemoryRefreshTokenRepository::new();
        let created = repo.create(&new_token(1, Duration::days(7))).await.unwrap();

        assert!(!created.revoked);
        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, 1);
        assert!(!found.is_expired());
    }

    #[tokio::test]
    async fn test_find_missing_token() {
        let repo = InMemoryRefreshTokenRepository::new();
        assert!(repo.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_first_caller_wins() {
        let repo = InMemoryRefreshTokenRepository::new();
        let created = repo.create(&new_token(1, Duration::days(7))).await.unwrap();

        let first = repo.revoke(created.id).await.unwrap();
        assert!(matches!(first, RevokeOutcome::Revoked(_)));

        let second = repo.revoke(created.id).await.unwrap();
        assert!(matches!(second, RevokeOutcome::AlreadyRevoked(_)));
    }

    #[tokio::test]
    async fn test_revoke_missing_token() {
        let repo = InMemoryRefreshTokenRepository::new();
        let outcome = repo.revoke(7).await.unwrap();
        assert!(matches!(outcome, RevokeOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_revoke_all_for_user_skips_other_users() {
        let repo = InMemoryRefreshTokenRepository::new();
        let mine_a = repo.create(&new_token(1, Duration::days(7))).await.unwrap();
        let mine_b = repo.create(&new_token(1, Duration::days(7))).await.unwrap();
        let theirs = repo.create(&new_token(2, Duration::days(7))).await.unwrap();

        let revoked = repo.revoke_all_for_user(1).await.unwrap();
        assert_eq!(revoked, 2);

        assert!(repo.find_by_id(mine_a.id).await.unwrap().unwrap().revoked);
        assert!(repo.find_by_id(mine_b.id).await.unwrap().unwrap().revoked);
        assert!(!repo.find_by_id(theirs.id).await.unwrap().unwrap().revoked);
    }

    #[tokio::test]
    async fn test_revoke_all_counts_only_unrevoked() {
        let repo = InMemoryRefreshTokenRepository::new();
        let first = repo.create(&new_token(1, Duration::days(7))).await.unwrap();
        repo.create(&new_token(1, Duration::days(7))).await.unwrap();
        repo.revoke(first.id).await.unwrap();

        let revoked = repo.revoke_all_for_user(1).await.unwrap();
        assert_eq!(revoked, 1);
    }

    #[tokio::test]
    async fn test_remove_expired_keeps_live_tokens() {
        let repo = InMemoryRefreshTokenRepository::new();
        let expired = repo
            .create(&new_token(1, Duration::hours(-1)))
            .await
            .unwrap();
        let live = repo.create(&new_token(1, Duration::days(7))).await.unwrap();

        let removed = repo.remove_expired().await.unwrap();
        assert_eq!(removed, 1);

        assert!(repo.find_by_id(expired.id).await.unwrap().is_none());
        assert!(repo.find_by_id(live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_expired_is_idempotent() {
        let repo = InMemoryRefreshTokenRepository::new();
        repo.create(&new_token(1, Duration::hours(-1)))
            .await
            .unwrap();

        assert_eq!(repo.remove_expired().await.unwrap(), 1);
        assert_eq!(repo.remove_expired().await.unwrap(), 0);
        assert_eq!(repo.token_count(), 0);
    }
}
