use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::repository::RefreshTokenRepository;
use crate::auth::service::AuthService;
use crate::auth::token::TokenConfig;
use crate::diary::repository::DiaryRepository;
use crate::diary::service::DiaryService;
use crate::pets::repository::PetRepository;
use crate::pets::service::PetsService;
use crate::users::repository::UserRepository;
use crate::users::service::UsersService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub users_service: Arc<UsersService>,
    pub pets_service: Arc<PetsService>,
    pub diary_service: Arc<DiaryService>,
}

impl AppState {
    pub fn new(
        token_config: TokenConfig,
        users: Arc<dyn UserRepository + Send + Sync>,
        refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
        pets: Arc<dyn PetRepository + Send + Sync>,
        diary: Arc<dyn DiaryRepository + Send + Sync>,
    ) -> Self {
        let users_service = Arc::new(UsersService::new(users));
        let auth_service = Arc::new(AuthService::new(
            users_service.clone(),
            refresh_tokens,
            token_config,
        ));
        let pets_service = Arc::new(PetsService::new(pets.clone(), users_service.clone()));
        let diary_service = Arc::new(DiaryService::new(diary, pets));

        Self {
            auth_service,
            users_service,
            pets_service,
            diary_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            // Infrastructure details stay in the logs, not the response body
            AppError::JwtError(_) | AppError::DatabaseError(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::auth::repository::InMemoryRefreshTokenRepository;
    use crate::diary::repository::InMemoryDiaryRepository;
    use crate::pets::repository::InMemoryPetRepository;
    use crate::users::repository::InMemoryUserRepository;
    use chrono::Duration;

    /// Token configuration with deterministic settings for tests
    pub fn test_token_config() -> TokenConfig {
        TokenConfig::new(
            "test-secret".to_string(),
            Duration::minutes(15),
            Duration::days(7),
        )
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        users: Option<Arc<dyn UserRepository + Send + Sync>>,
        refresh_tokens: Option<Arc<dyn RefreshTokenRepository + Send + Sync>>,
        pets: Option<Arc<dyn PetRepository + Send + Sync>>,
        diary: Option<Arc<dyn DiaryRepository + Send + Sync>>,
        token_config: Option<TokenConfig>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                users: None,
                refresh_tokens: None,
                pets: None,
                diary: None,
                token_config: None,
            }
        }

        pub fn with_users(mut self, repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
            self.users = Some(repo);
            self
        }

        pub fn with_refresh_tokens(
            mut self,
            repo: Arc<dyn RefreshTokenRepository + Send + Sync>,
        ) -> Self {
            self.refresh_tokens = Some(repo);
            self
        }

        pub fn with_pets(mut self, repo: Arc<dyn PetRepository + Send + Sync>) -> Self {
            self.pets = Some(repo);
            self
        }

        pub fn with_diary(mut self, repo: Arc<dyn DiaryRepository + Send + Sync>) -> Self {
            self.diary = Some(repo);
            self
        }

        pub fn with_token_config(mut self, config: TokenConfig) -> Self {
            self.token_config = Some(config);
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                self.token_config.unwrap_or_else(test_token_config),
                self.users
                    .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new())),
                self.refresh_tokens
                    .unwrap_or_else(|| Arc::new(InMemoryRefreshTokenRepository::new())),
                self.pets
                    .unwrap_or_else(|| Arc::new(InMemoryPetRepository::new())),
                self.diary
                    .unwrap_or_else(|| Arc::new(InMemoryDiaryRepository::new())),
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
