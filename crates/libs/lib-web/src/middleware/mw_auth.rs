//! # Authentication Middleware
//!
//! Resolves the bearer token of a request to the admin it belongs to.
//!
//! The token is read from the `Authorization: Bearer <token>` header first, then
//! from the `access_token` cookie set at sign-in. On success the admin record is
//! injected into the request extensions as [`CurrentAdmin`]:
//!
//! ```rust,ignore
//! use axum::extract::Extension;
//! use lib_web::middleware::CurrentAdmin;
//!
//! async fn handler(Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>) -> String {
//!     format!("Hello, {}!", admin.username)
//! }
//! ```
//!
//! Every failure (no token, bad signature, expired, admin deleted) answers with
//! the same 401; the reason is only logged.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use lib_core::{model::store::Admin, AppError};
use tower_cookies::{Cookie, Cookies};
use tracing::{debug, warn};

use crate::server::AdminAuth;

/// Name of the cookie carrying the access token.
pub const AUTH_TOKEN: &str = "access_token";

/// The authenticated admin of the current request.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Admin);

/// Middleware rejecting requests without a valid token.
///
/// Use with `axum::middleware::from_fn_with_state` as a `route_layer`.
pub async fn require_auth(
    State(auth): State<Arc<AdminAuth>>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let admin = authenticate_request(&auth, req.headers(), &cookies).await?;

    debug!("[AUTH] Authenticated admin: {} (id: {})", admin.username, admin.id);

    req.extensions_mut().insert(CurrentAdmin(admin));

    Ok(next.run(req).await)
}

/// Find the request's token and resolve it to an admin.
pub async fn authenticate_request(
    auth: &AdminAuth,
    headers: &HeaderMap,
    cookies: &Cookies,
) -> Result<Admin, AppError> {
    let Some(token) = extract_token(headers, cookies) else {
        warn!("[AUTH] No bearer token in header or cookie");
        return Err(AppError::Unauthorized);
    };

    Ok(auth.authenticate(&token).await?)
}

fn extract_token(headers: &HeaderMap, cookies: &Cookies) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token);

    from_header.or_else(|| {
        cookies
            .get(AUTH_TOKEN)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Token part of an `Authorization` value; the scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<String> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

// region: --- Token Cookie
/// Store `token` in the auth cookie for `max_age`.
pub fn set_token_cookie(cookies: &Cookies, token: &str, max_age: chrono::Duration) {
    let mut cookie = Cookie::new(AUTH_TOKEN, token.to_string());
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(max_age.num_seconds()));

    cookies.add(cookie);
}

pub fn remove_token_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::from(AUTH_TOKEN);
    cookie.set_path("/");

    cookies.remove(cookie);
}
// endregion: --- Token Cookie
