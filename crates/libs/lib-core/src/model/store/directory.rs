//! # Admin Directory
//!
//! Exposes the `admins` table to the sign-in flow through
//! [`lib_auth::UserDirectory`].

use async_trait::async_trait;
use lib_auth::{DirectoryError, IdentityRecord, UserDirectory};

use super::admin_repository::AdminRepository;
use super::models::Admin;
use super::DbPool;

impl IdentityRecord for Admin {
    fn id(&self) -> i64 {
        self.id
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn credential(&self) -> &str {
        &self.password_hash
    }
}

/// [`UserDirectory`] backed by the SQLite pool.
#[derive(Clone)]
pub struct AdminDirectory {
    pool: DbPool,
}

impl AdminDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for AdminDirectory {
    type Record = Admin;

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, DirectoryError> {
        Ok(AdminRepository::find_by_username(&self.pool, username).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Admin>, DirectoryError> {
        Ok(AdminRepository::find_by_id(&self.pool, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::AdminForCreate;
    use lib_auth::{AuthError, Authenticator, CredentialHasher, SystemClock, TokenService};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn setup_test_db() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS admins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                surname TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                phone TEXT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("Failed to create admins table");

        pool
    }

    #[tokio::test]
    async fn test_sign_in_against_database() {
        let pool = setup_test_db().await;
        let hasher = CredentialHasher::new(1_000);
        let credential = hasher.hash("Password1!").unwrap();
        AdminRepository::create(
            &pool,
            AdminForCreate {
                name: "Alice".to_string(),
                surname: "Smith".to_string(),
                email: "alice@shop.io".to_string(),
                phone: None,
                username: "alice".to_string(),
                password_hash: credential.into_string(),
            },
        )
        .await
        .unwrap();

        let tokens = TokenService::new(
            "test-secret-key-must-be-at-least-32-characters-long!",
            chrono::Duration::minutes(60),
            Arc::new(SystemClock),
        )
        .unwrap();
        let auth = Authenticator::new(AdminDirectory::new(pool), hasher, tokens).unwrap();

        let signed_in = auth.sign_in("alice", "Password1!").await.unwrap();
        let resolved = auth.authenticate(&signed_in.token).await.unwrap();
        assert_eq!(resolved.username, "alice");

        assert!(matches!(
            auth.sign_in("alice", "password1!").await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            auth.sign_in("ghost", "Password1!").await,
            Err(AuthError::Unauthorized)
        ));
    }
}
