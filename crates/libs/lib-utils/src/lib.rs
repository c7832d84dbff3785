//! # Utilities Library
//!
//! Shared utility functions for base64 encoding, environment variables, time, and validation.

pub mod b64;
pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use b64::{ab64_decode, ab64_encode};
pub use envs::{get_env, get_env_or, get_env_parse_or};
pub use time::now_utc;
pub use validation::{
    validate_alpha, validate_email, validate_length, validate_min_length,
    validate_password_complexity, validate_phone, validate_username,
};
