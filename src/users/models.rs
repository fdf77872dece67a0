use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for user accounts. The password hash never leaves the
/// core boundary; convert to [`SafeUser`] before handing the record out.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Strips the password hash, leaving the only representation that may
    /// cross the service boundary.
    pub fn into_safe(self) -> SafeUser {
        SafeUser {
            id: self.id,
            username: self.username,
            email: self.email,
        }
    }
}

/// Outward-facing user projection with credentials removed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafeUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Account creation input with the password already hashed
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
