//! # Admin Handlers
//!
//! Sign-in / sign-out and CRUD over admin accounts.
//!
//! ## Overview
//!
//! - Sign-in takes the OAuth2 password form, returns an [`AuthResponse`] and also
//!   stores the token in the `access_token` cookie.
//! - Creating an admin needs a valid token, except while the `admins` table is
//!   empty so the first account can be bootstrapped.
//! - Passwords are hashed on a blocking worker thread and never returned.
//! - A stored credential in an outdated format is replaced on successful sign-in.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Form, Json, Path, State},
    http::{HeaderMap, StatusCode},
};
use lib_core::dto::{
    AdminCreateRequest, AdminInfo, AdminListResponse, AdminResponse, AdminUpdateRequest,
    AuthResponse, MessageResponse, SignInForm,
};
use lib_core::model::store::{AdminForCreate, AdminForUpdate, AdminRepository};
use lib_core::{AppError, DbPool, Result};
use tower_cookies::Cookies;
use tracing::{debug, info, instrument, warn};

use crate::middleware::mw_auth::{remove_token_cookie, set_token_cookie};
use crate::middleware::{authenticate_request, CurrentAdmin};
use crate::server::AdminAuth;

/// Sign in with the OAuth2 password form (`username`, `password`).
///
/// # Returns
///
/// * `Ok(AuthResponse)` - token in the body and in the `access_token` cookie
/// * `Err(AppError::Unauthorized)` - unknown username or wrong password (same response for both)
#[instrument(skip_all, fields(username = %form.username))]
pub async fn sign_in(
    State(pool): State<DbPool>,
    State(auth): State<Arc<AdminAuth>>,
    cookies: Cookies,
    Form(form): Form<SignInForm>,
) -> Result<Json<AuthResponse>> {
    info!("[SIGN IN] Sign in attempt");

    let signed_in = auth.sign_in(&form.username, &form.password).await?;
    let admin = signed_in.record;

    if let Some(upgraded) = signed_in.upgraded_credential {
        match AdminRepository::update_password(&pool, admin.id, upgraded.as_str()).await {
            Ok(()) => info!("[SIGN IN] Upgraded stored credential for admin {}", admin.id),
            // The sign-in itself already succeeded.
            Err(e) => warn!("[SIGN IN] Failed to store upgraded credential: {}", e),
        }
    }

    set_token_cookie(&cookies, &signed_in.token, auth.tokens().default_ttl());

    info!("[SIGN IN] Admin {} signed in", admin.id);

    Ok(Json(AuthResponse::new(
        admin,
        "Sign in admin successfully",
        signed_in.token,
        signed_in.expires_at,
    )))
}

/// Clear the auth cookie. Tokens are stateless, so an already issued token
/// stays valid until it expires.
pub async fn sign_out(cookies: Cookies) -> Json<MessageResponse> {
    remove_token_cookie(&cookies);

    Json(MessageResponse::new("Signed out successfully"))
}

/// Create a new admin and sign it in.
///
/// Requires a valid token unless no admin exists yet. The JSON body is parsed
/// after that check.
///
/// # Returns
///
/// * `Ok((StatusCode::CREATED, AuthResponse))` - created, with a token for the new admin
/// * `Err(AppError::Unauthorized)` - admins exist and the request has no valid token
/// * `Err(AppError::InvalidInput)` - malformed body, or a field failed validation
/// * `Err(AppError::Conflict)` - username or email already taken
#[instrument(skip_all)]
pub async fn create_admin(
    State(pool): State<DbPool>,
    State(auth): State<Arc<AdminAuth>>,
    cookies: Cookies,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    info!("[CREATE ADMIN] New admin request");

    if AdminRepository::count(&pool).await? > 0 {
        let creator = authenticate_request(&auth, &headers, &cookies).await?;
        debug!("[CREATE ADMIN] Requested by admin {}", creator.id);
    } else {
        info!("[CREATE ADMIN] No admins yet, creating the first account");
    }

    let Json(req) = Json::<AdminCreateRequest>::from_bytes(&body).map_err(|rejection| {
        warn!("[CREATE ADMIN] Malformed body: {}", rejection.body_text());
        AppError::InvalidInput(rejection.body_text())
    })?;
    debug!("[CREATE ADMIN] Username: {}", req.username);

    req.validate()?;

    if AdminRepository::find_by_username(&pool, &req.username).await?.is_some() {
        warn!("[CREATE ADMIN] Username already taken: {}", req.username);
        return Err(AppError::Conflict("Username already taken".to_string()));
    }
    if AdminRepository::find_by_email(&pool, &req.email).await?.is_some() {
        warn!("[CREATE ADMIN] Email already registered: {}", req.email);
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    debug!("[CREATE ADMIN] Hashing password...");
    let credential = auth.hash_blocking(&req.password).await?;

    let admin = AdminRepository::create(
        &pool,
        AdminForCreate {
            name: req.name,
            surname: req.surname,
            email: req.email,
            phone: req.phone,
            username: req.username,
            password_hash: credential.into_string(),
        },
    )
    .await?;

    let issued = auth.issue_for(&admin)?;
    set_token_cookie(&cookies, &issued.token, auth.tokens().default_ttl());

    info!("[CREATE ADMIN] Admin {} created", admin.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(
            admin,
            "Admin created successfully",
            issued.token,
            issued.expires_at,
        )),
    ))
}

/// List all admins.
pub async fn list_admins(State(pool): State<DbPool>) -> Result<Json<AdminListResponse>> {
    let admins = AdminRepository::list(&pool).await?;

    Ok(Json(AdminListResponse {
        admins: admins.into_iter().map(AdminInfo::from).collect(),
        message: "Get admins successfully".to_string(),
    }))
}

/// The admin owning the request's token.
pub async fn me(Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>) -> Json<AdminResponse> {
    Json(AdminResponse {
        admin: admin.into(),
        message: "Get admin successfully".to_string(),
    })
}

pub async fn get_admin(State(pool): State<DbPool>, Path(id): Path<i64>) -> Result<Json<AdminResponse>> {
    let admin = AdminRepository::find_by_id(&pool, id)
        .await?
        .ok_or_else(admin_not_found)?;

    Ok(Json(AdminResponse {
        admin: admin.into(),
        message: "Get admin successfully".to_string(),
    }))
}

/// Update the given fields of an admin. A new password is hashed first.
#[instrument(skip_all, fields(id = %id, by = %current.0.id))]
pub async fn update_admin(
    State(pool): State<DbPool>,
    State(auth): State<Arc<AdminAuth>>,
    Extension(current): Extension<CurrentAdmin>,
    Path(id): Path<i64>,
    Json(req): Json<AdminUpdateRequest>,
) -> Result<Json<AdminResponse>> {
    req.validate()?;

    let mut update = AdminForUpdate::new();
    if let Some(name) = req.name {
        update = update.name(name);
    }
    if let Some(surname) = req.surname {
        update = update.surname(surname);
    }
    if let Some(email) = req.email {
        update = update.email(email);
    }
    if let Some(phone) = req.phone {
        update = update.phone(phone);
    }
    if let Some(username) = req.username {
        update = update.username(username);
    }
    if let Some(password) = req.password {
        debug!("[UPDATE ADMIN] Hashing new password...");
        update = update.password_hash(auth.hash_blocking(&password).await?.into_string());
    }

    let admin = AdminRepository::update(&pool, id, update)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => admin_not_found(),
            e => AppError::from(e),
        })?;

    info!("[UPDATE ADMIN] Admin {} updated", admin.id);

    Ok(Json(AdminResponse {
        admin: admin.into(),
        message: "Admin updated successfully".to_string(),
    }))
}

#[instrument(skip_all, fields(id = %id, by = %current.0.id))]
pub async fn delete_admin(
    State(pool): State<DbPool>,
    Extension(current): Extension<CurrentAdmin>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    if !AdminRepository::delete(&pool, id).await? {
        return Err(admin_not_found());
    }

    info!("[DELETE ADMIN] Admin {} deleted", id);

    Ok(Json(MessageResponse::new("Admin deleted successfully")))
}

fn admin_not_found() -> AppError {
    AppError::NotFound("Admin not found".to_string())
}
