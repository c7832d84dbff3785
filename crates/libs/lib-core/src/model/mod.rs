//! # Model Layer
//!
//! Persistence for admin accounts.

pub mod store;
