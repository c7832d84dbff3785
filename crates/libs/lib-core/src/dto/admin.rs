//! # Admin Data Transfer Objects
//!
//! Request and response structures for the `/api/admins` endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/admins/sign_in` - [`SignInForm`] (form) -> [`AuthResponse`]
//! - `POST /api/admins` - [`AdminCreateRequest`] -> [`AuthResponse`]
//! - `GET /api/admins` - [`AdminListResponse`]
//! - `GET /api/admins/{id}`, `GET /api/admins/me` - [`AdminResponse`]
//! - `PUT /api/admins/{id}` - [`AdminUpdateRequest`] -> [`AdminResponse`]
//! - `DELETE /api/admins/{id}`, `POST /api/admins/sign_out` - [`MessageResponse`]
//!
//! Responses are explicit projections of [`Admin`]: the stored credential never
//! appears in any of them.
//!
//! ## Wire Format
//!
//! Field names are snake_case. Sign-in response:
//!
//! ```text
//! {
//!   "admin": {
//!     "id": 1,
//!     "name": "Alice",
//!     "surname": "Smith",
//!     "email": "alice@shop.io",
//!     "phone": "+4915112345678",
//!     "username": "alice",
//!     "created_at": "2024-01-01T00:00:00Z"
//!   },
//!   "message": "Sign in admin successfully",
//!   "access_token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
//!   "token_type": "bearer",
//!   "token_expires_at": 1704070800
//! }
//! ```

use chrono::{DateTime, Utc};
use lib_utils::validation::{
    validate_alpha, validate_email, validate_password_complexity, validate_phone,
    validate_username,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::model::store::Admin;

pub const TOKEN_TYPE: &str = "bearer";

// region: --- Requests

/// OAuth2 password-grant form posted to `sign_in`.
///
/// Extra form fields (`grant_type`, `scope`, ...) are ignored. No complexity
/// check here: a password that fails it simply fails to sign in.
#[derive(Clone, Deserialize)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/admins`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreateRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub username: String,
    pub password: String,
}

impl AdminCreateRequest {
    /// Check every field before the password reaches the hasher.
    pub fn validate(&self) -> Result<()> {
        validate_alpha(&self.name, "Name").map_err(AppError::InvalidInput)?;
        validate_alpha(&self.surname, "Surname").map_err(AppError::InvalidInput)?;
        validate_email(&self.email).map_err(AppError::InvalidInput)?;
        if let Some(phone) = &self.phone {
            validate_phone(phone).map_err(AppError::InvalidInput)?;
        }
        validate_username(&self.username).map_err(AppError::InvalidInput)?;
        validate_password_complexity(&self.password).map_err(AppError::InvalidInput)?;
        Ok(())
    }
}

/// Body of `PUT /api/admins/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AdminUpdateRequest {
    /// Check the fields that are present.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_alpha(name, "Name").map_err(AppError::InvalidInput)?;
        }
        if let Some(surname) = &self.surname {
            validate_alpha(surname, "Surname").map_err(AppError::InvalidInput)?;
        }
        if let Some(email) = &self.email {
            validate_email(email).map_err(AppError::InvalidInput)?;
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone).map_err(AppError::InvalidInput)?;
        }
        if let Some(username) = &self.username {
            validate_username(username).map_err(AppError::InvalidInput)?;
        }
        if let Some(password) = &self.password {
            validate_password_complexity(password).map_err(AppError::InvalidInput)?;
        }
        Ok(())
    }
}

// endregion: --- Requests

// region: --- Responses

/// Public admin information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminInfo {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: Option<String>,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Admin> for AdminInfo {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name.clone(),
            surname: admin.surname.clone(),
            email: admin.email.clone(),
            phone: admin.phone.clone(),
            username: admin.username.clone(),
            created_at: admin.created_at,
        }
    }
}

impl From<Admin> for AdminInfo {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            surname: admin.surname,
            email: admin.email,
            phone: admin.phone,
            username: admin.username,
            created_at: admin.created_at,
        }
    }
}

/// Returned on sign-in and on admin creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub admin: AdminInfo,
    pub message: String,
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
    /// Expiry as a unix timestamp (seconds)
    pub token_expires_at: i64,
}

impl AuthResponse {
    pub fn new(
        admin: impl Into<AdminInfo>,
        message: impl Into<String>,
        access_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            admin: admin.into(),
            message: message.into(),
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            token_expires_at: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub admin: AdminInfo,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminListResponse {
    pub admins: Vec<AdminInfo>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Error body produced by `AppError`'s `IntoResponse`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// endregion: --- Responses
