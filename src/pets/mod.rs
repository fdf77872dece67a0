// Public API - what other modules can use
pub use models::PetModel;
pub use service::PetsService;

// Internal modules
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
