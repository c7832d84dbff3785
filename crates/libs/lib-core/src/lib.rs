//! # Core Library
//!
//! Configuration, error type, admin store, and DTOs for the admin backend.

pub mod config;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{create_pool, ensure_sqlite_dir, AdminDirectory, AdminRepository, DbPool};
