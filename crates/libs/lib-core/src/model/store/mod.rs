//! # Database Store
//!
//! Database connection pool and the admin repository.

// region: --- Modules
pub mod admin_repository;
pub mod directory;
pub mod models;
// endregion: --- Modules

// region: --- Re-exports
pub use admin_repository::AdminRepository;
pub use directory::AdminDirectory;
pub use models::{Admin, AdminForCreate, AdminForUpdate};
// endregion: --- Re-exports

// region: --- Types and Functions
use std::path::Path;

use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use tracing::info;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Create a new SQLite connection pool, creating the database file if missing.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true);

    SqlitePool::connect_with(options).await
}

/// Create the parent directory of a file-backed SQLite database.
///
/// In-memory and non-SQLite URLs are left alone.
pub fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };

    let db_path = db_path.split('?').next().unwrap_or(db_path);
    if db_path.is_empty() || db_path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created database directory: {:?}", parent);
        }
    }
    Ok(())
}
// endregion: --- Types and Functions

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_sqlite_dir_creates_parent() {
        let dir = std::env::temp_dir().join(format!("admin-db-{}", std::process::id()));
        let url = format!("sqlite:{}/nested/admin.db?mode=rwc", dir.display());

        ensure_sqlite_dir(&url).unwrap();
        assert!(dir.join("nested").is_dir());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_ensure_sqlite_dir_ignores_memory() {
        ensure_sqlite_dir("sqlite::memory:").unwrap();
        ensure_sqlite_dir("postgres://localhost/db").unwrap();
    }
}
