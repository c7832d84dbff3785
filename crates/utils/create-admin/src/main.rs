//! # Create Admin Utility
//!
//! This binary creates an admin account directly in the database, e.g. the
//! first account of a fresh deployment.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package create-admin --bin create_admin
//! ```
//!
//! Each field is read from `ADMIN_<FIELD>` (`ADMIN_NAME`, `ADMIN_SURNAME`,
//! `ADMIN_EMAIL`, `ADMIN_PHONE`, `ADMIN_USERNAME`, `ADMIN_PASSWORD`) when set,
//! otherwise prompted for. `DATABASE_URL` and `PASSWORD_HASH_ROUNDS` are read
//! the same way the server reads them.
//!
//! The program will:
//! 1. Connect to the database and apply pending migrations
//! 2. Collect and validate the admin fields
//! 3. Refuse a username or email that is already taken
//! 4. Hash the password and insert the admin

use std::io::{self, Write};

use lib_auth::CredentialHasher;
use lib_core::config::{DEFAULT_DATABASE_URL, DEFAULT_HASH_ROUNDS};
use lib_core::dto::AdminCreateRequest;
use lib_core::model::store::{AdminForCreate, AdminRepository};
use lib_core::{create_pool, ensure_sqlite_dir};
use lib_utils::{get_env_or, get_env_parse_or};

const MIGRATIONS_PATH: &str = "migrations";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    println!("============================================");
    println!("  Create Admin Utility");
    println!("============================================");
    println!();

    let database_url = get_env_or("DATABASE_URL", DEFAULT_DATABASE_URL);
    let rounds: u32 = get_env_parse_or("PASSWORD_HASH_ROUNDS", DEFAULT_HASH_ROUNDS)?;

    // Connect to database
    println!("Connecting to database...");
    ensure_sqlite_dir(&database_url)?;
    let pool = create_pool(&database_url).await?;
    sqlx::migrate::Migrator::new(std::path::Path::new(MIGRATIONS_PATH))
        .await?
        .run(&pool)
        .await?;
    println!("Connected successfully.");
    println!("Existing admins: {}", AdminRepository::count(&pool).await?);
    println!();

    let phone = read_field("Phone (optional)", "ADMIN_PHONE")?;
    let req = AdminCreateRequest {
        name: read_field("Name", "ADMIN_NAME")?,
        surname: read_field("Surname", "ADMIN_SURNAME")?,
        email: read_field("Email", "ADMIN_EMAIL")?,
        phone: (!phone.is_empty()).then_some(phone),
        username: read_field("Username", "ADMIN_USERNAME")?,
        password: read_field("Password", "ADMIN_PASSWORD")?,
    };
    req.validate()?;

    if AdminRepository::find_by_username(&pool, &req.username).await?.is_some() {
        anyhow::bail!("Username already taken: {}", req.username);
    }
    if AdminRepository::find_by_email(&pool, &req.email).await?.is_some() {
        anyhow::bail!("Email already registered: {}", req.email);
    }

    println!();
    println!("Hashing password...");
    let credential = CredentialHasher::new(rounds).hash(&req.password)?;

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

    println!("Created admin '{}' (id {}).", admin.username, admin.id);

    Ok(())
}

/// Value of `env_name` if set, otherwise a trimmed line from stdin.
fn read_field(label: &str, env_name: &'static str) -> io::Result<String> {
    if let Ok(value) = std::env::var(env_name) {
        return Ok(value.trim().to_string());
    }

    print!("{}: ", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
