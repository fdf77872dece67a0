// Public API - what other modules can use
pub use models::DiaryEntryModel;
pub use service::DiaryService;

// Internal modules
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
