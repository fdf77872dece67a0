use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::models::{NewUserRecord, SafeUser, UserModel};
use super::repository::UserRepository;
use crate::auth::password;
use crate::shared::AppError;

/// Service for account management. Other services treat this as the
/// user-lookup collaborator; credentials never leave it unhashed.
pub struct UsersService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UsersService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Creates an account with a bcrypt-hashed password. Fails with a
    /// conflict when the email is already registered.
    #[instrument(skip(self, plaintext_password))]
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        plaintext_password: &str,
    ) -> Result<SafeUser, AppError> {
        if self.repository.find_by_email(email).await?.is_some() {
            warn!(email = %email, "Registration rejected, email already registered");
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let record = NewUserRecord {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password::hash_password(plaintext_password)?,
        };

        let user = self.repository.create(&record).await?;
        info!(user_id = user.id, "User account created");
        Ok(user.into_safe())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        self.repository.find_by_email(email).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserModel>, AppError> {
        self.repository.find_by_id(id).await
    }
}
