use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewUserRecord, UserModel};
use crate::shared::AppError;

/// Trait for user account storage operations
#[async_trait]
pub trait UserRepository {
    /// Inserts a new account. Fails with a conflict when the email is
    /// already registered.
    async fn create(&self, user: &NewUserRecord) -> Result<UserModel, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<i64, UserModel>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Returns the current number of accounts in the repository
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Drops an account. Development helper for simulating deleted users.
    pub fn remove_user(&self, id: i64) {
        self.users.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create(&self, user: &NewUserRecord) -> Result<UserModel, AppError> {
        debug!(email = %user.email, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "Email already registered");
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let model = UserModel {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
        };
        users.insert(id, model.clone());

        debug!(user_id = id, "User created successfully in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(&id).cloned())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create(&self, user: &NewUserRecord) -> Result<UserModel, AppError> {
        debug!(email = %user.email, "Creating user in database");

        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    warn!(email = %user.email, "Email already registered");
                    return AppError::Conflict("Email already registered".to_string());
                }
            }
            warn!(error = %e, "Failed to create user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(UserModel {
            id: row.get("id"),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
        })
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by email");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|row| UserModel {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = id, "Failed to fetch user by id");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|row| UserModel {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }))
    }
}
