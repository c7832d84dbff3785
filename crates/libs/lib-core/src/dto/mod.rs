//! # Data Transfer Objects (DTOs)
//!
//! Request and response structures for the admin REST API.

pub mod admin;

pub use admin::*;
