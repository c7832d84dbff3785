//! # Admin Repository
//!
//! Database operations for admin accounts.
//!
//! All methods are associated functions taking the pool explicitly and return
//! raw `sqlx::Error`; callers convert into `AppError`, which maps unique-constraint
//! violations on `username` / `email` to `Conflict`.

use sqlx::query_as;

use super::models::{Admin, AdminForCreate, AdminForUpdate};
use super::DbPool;

/// Repository for admin database operations.
pub struct AdminRepository;

impl AdminRepository {
    /// Find an admin by ID.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Admin>, sqlx::Error> {
        query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an admin by username (exact match).
    pub async fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<Admin>, sqlx::Error> {
        query_as::<_, Admin>("SELECT * FROM admins WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find an admin by email address.
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        query_as::<_, Admin>("SELECT * FROM admins WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// All admins, oldest first.
    pub async fn list(pool: &DbPool) -> Result<Vec<Admin>, sqlx::Error> {
        query_as::<_, Admin>("SELECT * FROM admins ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Number of admin accounts.
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Insert a new admin and return the stored row.
    ///
    /// # Errors
    ///
    /// A duplicate username or email fails with a unique-violation database error.
    pub async fn create(pool: &DbPool, admin: AdminForCreate) -> Result<Admin, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO admins (name, surname, email, phone, username, password_hash) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&admin.name)
        .bind(&admin.surname)
        .bind(&admin.email)
        .bind(&admin.phone)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update an existing admin using `AdminForUpdate`.
    ///
    /// Only fields that are `Some` are written. Returns `RowNotFound` when no
    /// admin has this ID.
    pub async fn update(pool: &DbPool, id: i64, admin_data: AdminForUpdate) -> Result<Admin, sqlx::Error> {
        if admin_data.is_empty() {
            return query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
                .bind(id)
                .fetch_one(pool)
                .await;
        }

        let mut updates = Vec::new();
        let mut values = Vec::new();

        let fields = [
            ("name", admin_data.name),
            ("surname", admin_data.surname),
            ("email", admin_data.email),
            ("phone", admin_data.phone),
            ("username", admin_data.username),
            ("password_hash", admin_data.password_hash),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                updates.push(format!("{} = ?", column));
                values.push(value);
            }
        }

        let query_str = format!("UPDATE admins SET {} WHERE id = ?", updates.join(", "));
        let mut query = sqlx::query(&query_str);
        for value in &values {
            query = query.bind(value);
        }

        let result = query.bind(id).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Replace only the stored credential, e.g. after a rehash on sign-in.
    pub async fn update_password(pool: &DbPool, id: i64, password_hash: &str) -> Result<(), sqlx::Error> {
        let result = sqlx::query("UPDATE admins SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    /// Delete an admin. Returns `false` when no admin has this ID.
    pub async fn delete(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admins WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Create an in-memory SQLite database for testing
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

    fn new_admin(username: &str, email: &str) -> AdminForCreate {
        AdminForCreate {
            name: "Alice".to_string(),
            surname: "Smith".to_string(),
            email: email.to_string(),
            phone: Some("+4915112345678".to_string()),
            username: username.to_string(),
            password_hash: "$pbkdf2-sha256$i=1000,l=32$c2FsdA$ZGlnZXN0".to_string(),
        }
    }

    // ========== Creation Tests ==========

    #[tokio::test]
    async fn test_create_admin() {
        let pool = setup_test_db().await;

        let admin = AdminRepository::create(&pool, new_admin("alice", "alice@shop.io"))
            .await
            .unwrap();

        assert_eq!(admin.username, "alice");
        assert_eq!(admin.email, "alice@shop.io");
        assert_eq!(admin.phone.as_deref(), Some("+4915112345678"));
        assert!(admin.id > 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_username_is_conflict() {
        let pool = setup_test_db().await;
        AdminRepository::create(&pool, new_admin("alice", "alice@shop.io"))
            .await
            .unwrap();

        let err = AdminRepository::create(&pool, new_admin("alice", "other@shop.io"))
            .await
            .unwrap_err();

        match AppError::from(err) {
            AppError::Conflict(msg) => assert_eq!(msg, "Username already taken"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_email_is_conflict() {
        let pool = setup_test_db().await;
        AdminRepository::create(&pool, new_admin("alice", "alice@shop.io"))
            .await
            .unwrap();

        let err = AdminRepository::create(&pool, new_admin("alicia", "alice@shop.io"))
            .await
            .unwrap_err();

        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    // ========== Lookup Tests ==========

    #[tokio::test]
    async fn test_find_by_id_username_and_email() {
        let pool = setup_test_db().await;
        let created = AdminRepository::create(&pool, new_admin("alice", "alice@shop.io"))
            .await
            .unwrap();

        let by_id = AdminRepository::find_by_id(&pool, created.id).await.unwrap();
        let by_username = AdminRepository::find_by_username(&pool, "alice").await.unwrap();
        let by_email = AdminRepository::find_by_email(&pool, "alice@shop.io").await.unwrap();

        assert_eq!(by_id.map(|a| a.id), Some(created.id));
        assert_eq!(by_username.map(|a| a.id), Some(created.id));
        assert_eq!(by_email.map(|a| a.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let pool = setup_test_db().await;

        assert!(AdminRepository::find_by_id(&pool, 999).await.unwrap().is_none());
        assert!(AdminRepository::find_by_username(&pool, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let pool = setup_test_db().await;
        assert_eq!(AdminRepository::count(&pool).await.unwrap(), 0);

        AdminRepository::create(&pool, new_admin("alice", "alice@shop.io")).await.unwrap();
        AdminRepository::create(&pool, new_admin("bob", "bob@shop.io")).await.unwrap();

        let admins = AdminRepository::list(&pool).await.unwrap();
        assert_eq!(AdminRepository::count(&pool).await.unwrap(), 2);
        assert_eq!(
            admins.iter().map(|a| a.username.as_str()).collect::<Vec<_>>(),
            vec!["alice", "bob"]
        );
    }

    // ========== Update / Delete Tests ==========

    #[tokio::test]
    async fn test_update_only_given_fields() {
        let pool = setup_test_db().await;
        let created = AdminRepository::create(&pool, new_admin("alice", "alice@shop.io"))
            .await
            .unwrap();

        let updated = AdminRepository::update(
            &pool,
            created.id,
            AdminForUpdate::new().surname("Jones".to_string()).phone("+12025550123".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(updated.surname, "Jones");
        assert_eq!(updated.phone.as_deref(), Some("+12025550123"));
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.password_hash, created.password_hash);
    }

    #[tokio::test]
    async fn test_update_missing_admin_is_row_not_found() {
        let pool = setup_test_db().await;

        let err = AdminRepository::update(&pool, 42, AdminForUpdate::new().name("Bob".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_update_password() {
        let pool = setup_test_db().await;
        let created = AdminRepository::create(&pool, new_admin("alice", "alice@shop.io"))
            .await
            .unwrap();

        AdminRepository::update_password(&pool, created.id, "$pbkdf2-sha256$i=2000,l=32$bmV3$bmV3")
            .await
            .unwrap();

        let stored = AdminRepository::find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "$pbkdf2-sha256$i=2000,l=32$bmV3$bmV3");
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = setup_test_db().await;
        let created = AdminRepository::create(&pool, new_admin("alice", "alice@shop.io"))
            .await
            .unwrap();

        assert!(AdminRepository::delete(&pool, created.id).await.unwrap());
        assert!(!AdminRepository::delete(&pool, created.id).await.unwrap());
        assert!(AdminRepository::find_by_id(&pool, created.id).await.unwrap().is_none());
    }
}
