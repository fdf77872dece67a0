// Public API - what other modules can use
pub use models::{SafeUser, UserModel};
pub use service::UsersService;

// Internal modules
pub mod models;
pub mod repository;
pub mod service;
