use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Admin entity representing a complete record from the `admins` table.
///
/// `password_hash` holds the encoded credential and must never be sent to a
/// client; the DTO layer projects this into `AdminInfo`.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Data structure for creating a new admin.
///
/// The password must already be hashed.
#[derive(Debug, Clone)]
pub struct AdminForCreate {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: Option<String>,
    pub username: String,
    pub password_hash: String,
}

/// Data structure for updating an existing admin.
///
/// All fields are optional - only provided fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct AdminForUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl AdminForUpdate {
    /// Create a new empty `AdminForUpdate` instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn surname(mut self, surname: String) -> Self {
        self.surname = Some(surname);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn phone(mut self, phone: String) -> Self {
        self.phone = Some(phone);
        self
    }

    pub fn username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Set the password hash (already encoded).
    pub fn password_hash(mut self, password_hash: String) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.username.is_none()
            && self.password_hash.is_none()
    }
}
