//! # Centralized Error Handling
//!
//! The application-wide error type [`AppError`], shared by the store, the DTO
//! validators and the HTTP handlers.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx)
//!    - [`InvalidInput`](AppError::InvalidInput) → 400 Bad Request
//!    - [`Unauthorized`](AppError::Unauthorized) → 401 Unauthorized, with `WWW-Authenticate: Bearer`
//!    - [`NotFound`](AppError::NotFound) → 404 Not Found
//!    - [`Conflict`](AppError::Conflict) → 409 Conflict (duplicate username / email)
//!
//! 2. **Server Errors** (5xx)
//!    - [`Config`](AppError::Config) → 500 Internal Server Error
//!    - [`Internal`](AppError::Internal) → 500 Internal Server Error
//!
//! Every error renders as `{"error": <message>, "code": <variant>}`. Server errors
//! get a generic message; the details only go to the log.
//!
//! ## Error Conversion
//!
//! - `From<AuthError>` - auth failures collapse into one uniform `Unauthorized`
//! - `From<sqlx::Error>` - missing rows become `NotFound`, unique violations `Conflict`
//! - `From<serde_json::Error>` - JSON errors become `InvalidInput`

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use lib_auth::AuthError;
use thiserror::Error;

use crate::dto::ErrorResponse;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Body of every 401, whatever the cause.
pub const UNAUTHORIZED_MESSAGE: &str = "Could not validate credentials";

#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input validation error.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing, invalid or expired credentials.
    ///
    /// **HTTP Status**: 401 Unauthorized
    #[error("Unauthorized")]
    Unauthorized,

    /// Requested resource not found.
    ///
    /// **HTTP Status**: 404 Not Found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness constraint violated.
    ///
    /// **HTTP Status**: 409 Conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (unexpected failures).
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Config(_) | AppError::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    /// Variant name, used as the `code` field of the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Config",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Unauthorized => "Unauthorized",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => tracing::error!("Server error: {}", self),
            StatusCode::UNAUTHORIZED => tracing::debug!("Auth error: {}", self),
            _ => tracing::debug!("Client error: {}", self),
        }

        let body = Json(ErrorResponse {
            error: self.user_message(),
            code: self.code().to_string(),
        });

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}

/// Convert `AuthError` to `AppError`.
impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized | AuthError::InvalidToken(_) => AppError::Unauthorized,
            // Bad secret, ttl or KDF input: a server-side fault, not the caller's.
            AuthError::Validation(msg) => AppError::Internal(msg),
            AuthError::Directory(e) => AppError::Internal(format!("User directory error: {}", e)),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Convert `sqlx::Error` to `AppError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(unique_violation_message(db_err.message()))
            }
            sqlx::Error::Database(db_err) => {
                AppError::Internal(format!("Database error: {}", db_err.message()))
            }
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON error: {}", err))
    }
}

// SQLite reports e.g. "UNIQUE constraint failed: admins.email".
fn unique_violation_message(db_message: &str) -> String {
    if db_message.contains(".username") {
        "Username already taken".to_string()
    } else if db_message.contains(".email") {
        "Email already registered".to_string()
    } else {
        "Record already exists".to_string()
    }
}
