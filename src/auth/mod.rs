// Public API - what other modules can use
pub use middleware::jwt_auth;
pub use types::{AccessClaims, SessionTokens};

// Internal modules
pub mod handlers;
mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod sweep;
pub mod token;
pub mod types;
