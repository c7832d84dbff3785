//! # Authentication Errors

use thiserror::Error;

/// Boxed error returned by a [`UserDirectory`](crate::UserDirectory) backend.
pub type DirectoryError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input to hashing or token issuance (bad secret, bad ttl).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Signature, format or expiry failure inside the token validator.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Uniform authentication failure. The cause is logged, never returned.
    #[error("Invalid credentials")]
    Unauthorized,

    /// The user directory failed; propagated as-is.
    #[error("User directory error: {0}")]
    Directory(#[source] DirectoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}
