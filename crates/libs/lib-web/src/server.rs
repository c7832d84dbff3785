//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] loads [`Config`], opens the pool, runs migrations and
//! builds the shared [`Authenticator`]; [`create_router`] wires the admin
//! routes and middleware and is also what the handler tests drive.

// region: --- Imports
use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use lib_auth::{Authenticator, CredentialHasher, SystemClock, TokenService};
use lib_core::{create_pool, ensure_sqlite_dir, AdminDirectory, AppError, Config, DbPool};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{log_requests, require_auth, stamp_req, RequestStamp};
// endregion: --- Imports

// region: --- AppState
/// Sign-in / authenticate flow over the `admins` table.
pub type AdminAuth = Authenticator<AdminDirectory>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub auth: Arc<AdminAuth>,
}

impl AppState {
    /// Build the hasher, token service and authenticator from `config`.
    pub fn new(db: DbPool, config: Config) -> lib_core::Result<Self> {
        let hasher = CredentialHasher::new(config.password_hash_rounds);
        let tokens = TokenService::new(&config.secret_key, config.token_ttl(), Arc::new(SystemClock))?;
        let auth = Authenticator::new(AdminDirectory::new(db.clone()), hasher, tokens)?;

        Ok(Self {
            db,
            config,
            auth: Arc::new(auth),
        })
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<AdminAuth> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
    /// Database migrations path
    pub migrations_path: &'static str,
    /// `tracing` filter directive (e.g. "info" or "lib_web=debug,info")
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            migrations_path: "./migrations",
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `BIND_ADDRESS`, `ALLOWED_ORIGINS` (comma separated)
    /// and `LOG_LEVEL`.
    pub fn from_env() -> Self {
        let default = Self::default();

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(default.allowed_origins);

        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or(default.bind_address),
            allowed_origins,
            log_level: std::env::var("LOG_LEVEL").unwrap_or(default.log_level),
            ..default
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server
///
/// Expects the environment (and `.env`) to be loaded already.
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - Database connection fails
/// - Database migrations fail
/// - Server binding fails
pub async fn start_server(server_config: ServerConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(server_config.log_level.to_lowercase())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;

    info!(" SHOP ADMIN BACKEND STARTING");
    info!(" Log level: {}", server_config.log_level);

    info!("Loading configuration...");
    let config = Config::from_env()?;
    config.validate()?;
    info!("Configuration loaded: {:?}", config);

    ensure_sqlite_dir(&config.database_url)?;
    info!("Database: {}", config.database_url);

    info!("Connecting to database...");
    let pool = create_pool(&config.database_url).await?;

    info!(" Running database migrations from: {}", server_config.migrations_path);
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(server_config.migrations_path)).await?;
    migrator.run(&pool).await?;
    info!(" Migrations complete");

    let state = AppState::new(pool, config)?;
    let app = create_router(state, &server_config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_address).await?;

    info!(" SERVER READY: http://{}", server_config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    info!("[ROUTE SETUP] Registering HTTP routes...");

    let protected = Router::new()
        .route("/api/admins", get(handlers::admin::list_admins))
        .route("/api/admins/me", get(handlers::admin::me))
        .route(
            "/api/admins/{id}",
            get(handlers::admin::get_admin)
                .put(handlers::admin::update_admin)
                .delete(handlers::admin::delete_admin),
        )
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/admins/sign_in", post(handlers::admin::sign_in))
        .route("/api/admins/sign_out", post(handlers::admin::sign_out))
        // Open while no admin exists; otherwise checked in the handler.
        .route("/api/admins", post(handlers::admin::create_admin))
        .route("/health", get(|| async { "OK" }))
        .merge(protected)
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            AppError::NotFound("Route not found".to_string())
        })
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(
            ServiceBuilder::new()
                // Request stamping (adds request ID) - outermost so everything below sees it
                .layer(axum::middleware::from_fn(stamp_req))
                .layer(axum::middleware::from_fn(log_requests))
                .layer(
                    tower_http::trace::TraceLayer::new_for_http()
                        .make_span_with(|request: &axum::http::Request<_>| {
                            let request_id = request
                                .extensions()
                                .get::<RequestStamp>()
                                .map(|s| s.id.clone())
                                .unwrap_or_else(|| "unknown".to_string());
                            tracing::info_span!(
                                "http_request",
                                request_id = %request_id,
                                method = %request.method(),
                                uri = %request.uri().path(),
                            )
                        })
                        .on_failure(
                            |error: tower_http::classify::ServerErrorsFailureClass,
                             latency: std::time::Duration,
                             _span: &tracing::Span| {
                                tracing::error!(
                                    error = ?error,
                                    latency_ms = latency.as_millis(),
                                    "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                                    error,
                                    latency.as_millis()
                                );
                            },
                        ),
                )
                .layer(cors),
        )
}

/// Log server information
fn log_server_info() {
    info!(" AUTH:");
    info!("   • POST   /api/admins/sign_in   (form: username, password)");
    info!("   • POST   /api/admins/sign_out");
    info!(" ADMINS:");
    info!("   • POST   /api/admins           (open until the first admin exists)");
    info!("   • GET    /api/admins");
    info!("   • GET    /api/admins/me");
    info!("   • GET    /api/admins/{{id}}");
    info!("   • PUT    /api/admins/{{id}}");
    info!("   • DELETE /api/admins/{{id}}");
    info!(" HEALTH:");
    info!("   • GET    /health");
}
// endregion: --- Server Setup
