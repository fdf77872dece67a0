use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for refresh-token records. Only the bcrypt hash of the
/// secret is stored; the raw secret exists solely in the external
/// `"<id>.<secret>"` string handed to the client.
///
/// A token is usable only while `revoked == false` and it has not passed
/// `expires_at`. Both conditions are terminal and indistinguishable to
/// callers: `revoked` flips true exactly once (consumed by a refresh or
/// revoked by logout) and rows are deleted only by the expiry sweep.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RefreshTokenModel {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenModel {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Insertion payload for a new refresh-token record
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fresh_token_is_not_expired() {
        let token = RefreshTokenModel {
            id: 1,
            user_id: 1,
            token_hash: "hash".to_string(),
            expires_at: Utc::now() + Duration::days(7),
            revoked: false,
            created_at: Utc::now(),
        };
        assert!(!token.is_expired());
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let token = RefreshTokenModel {
            id: 1,
            user_id: 1,
            token_hash: "hash".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
            revoked: false,
            created_at: Utc::now() - Duration::days(8),
        };
        assert!(token.is_expired());
    }
}
