//! # HTTP Request Handlers
//!
//! Axum handlers, one module per feature area.
//!
//! - **[`admin`]**: admin sign-in / sign-out and admin account CRUD
//!   - `POST /api/admins/sign_in` - Sign in with the OAuth2 password form
//!   - `POST /api/admins/sign_out` - Clear the auth cookie
//!   - `POST /api/admins` - Create an admin (open until the first one exists)
//!   - `GET /api/admins`, `GET /api/admins/me`, `GET|PUT|DELETE /api/admins/{id}`
//!
//! Protected handlers read the caller from `Extension<CurrentAdmin>`, injected by
//! [`require_auth`](crate::middleware::require_auth). All handlers return
//! `Result<_, AppError>`; the error renders itself as JSON with the right status.

pub mod admin;
