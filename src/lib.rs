// Library crate for the pawtrack record-keeping backend
// This file exposes the public API for integration tests

pub mod app;
pub mod auth;
pub mod config;
pub mod diary;
pub mod ownership;
pub mod pets;
pub mod shared;
pub mod users;

// Re-export commonly used types for easier access in tests
pub use auth::{AccessClaims, SessionTokens};
pub use config::AppConfig;
pub use shared::{AppError, AppState};
pub use users::SafeUser;
