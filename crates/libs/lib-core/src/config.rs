//! # Application Configuration
//!
//! Configuration loaded from environment variables and validated on startup so
//! a misconfigured deployment fails before it binds a port.
//!
//! There is no global instance: [`Config`] is built once by the server and
//! handed to whatever needs it (token service, handlers via `State<Config>`).
//!
//! ```rust,no_run
//! use lib_core::config::Config;
//!
//! let config = Config::from_env()?;
//! config.validate()?;
//! # Ok::<(), lib_core::AppError>(())
//! ```

use std::fmt;

use chrono::Duration;
use lib_utils::envs::{self, get_env, get_env_or, get_env_parse_or};

use crate::error::{AppError, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/admin.db";
pub const DEFAULT_TOKEN_EXPIRE_MINUTES: i64 = 60;
pub const DEFAULT_HASH_ROUNDS: u32 = 600_000;

const MIN_SECRET_LEN: usize = 32;
const MAX_TOKEN_EXPIRE_MINUTES: i64 = 43_200;
const MIN_HASH_ROUNDS: u32 = 1_000;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Symmetric key for signing and verifying access tokens
    ///
    /// **Must be at least 32 characters long.**
    pub secret_key: String,

    /// Access token validity period in minutes
    ///
    /// Valid range: 1-43200 (one minute to 30 days)
    pub access_token_expire_minutes: i64,

    /// PBKDF2 iteration count for newly hashed passwords
    pub password_hash_rounds: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | variable | default |
    /// |----------|---------|
    /// | `DATABASE_URL` | `sqlite:data/admin.db` |
    /// | `BACKEND_SECRET_COOKIE_KEY` | required |
    /// | `ACCESS_TOKEN_EXPIRE_MINUTES` | `60` |
    /// | `PASSWORD_HASH_ROUNDS` | `600000` |
    pub fn from_env() -> Result<Self> {
        let database_url = get_env_or("DATABASE_URL", DEFAULT_DATABASE_URL);

        let secret_key = get_env("BACKEND_SECRET_COOKIE_KEY").map_err(config_err)?;

        let access_token_expire_minutes =
            get_env_parse_or("ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_TOKEN_EXPIRE_MINUTES)
                .map_err(config_err)?;

        let password_hash_rounds =
            get_env_parse_or("PASSWORD_HASH_ROUNDS", DEFAULT_HASH_ROUNDS).map_err(config_err)?;

        Ok(Self {
            database_url,
            secret_key,
            access_token_expire_minutes,
            password_hash_rounds,
        })
    }

    /// Validate configuration values against security rules.
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "BACKEND_SECRET_COOKIE_KEY must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }

        if !(1..=MAX_TOKEN_EXPIRE_MINUTES).contains(&self.access_token_expire_minutes) {
            return Err(AppError::Config(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {} (30 days)",
                MAX_TOKEN_EXPIRE_MINUTES
            )));
        }

        if self.password_hash_rounds < MIN_HASH_ROUNDS {
            return Err(AppError::Config(format!(
                "PASSWORD_HASH_ROUNDS must be at least {}",
                MIN_HASH_ROUNDS
            )));
        }

        Ok(())
    }

    /// Default lifetime of an access token.
    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_expire_minutes)
    }
}

// The signing secret never reaches logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("secret_key", &"***")
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("password_hash_rounds", &self.password_hash_rounds)
            .finish()
    }
}

fn config_err(err: envs::Error) -> AppError {
    match err {
        envs::Error::MissingEnv(name) => AppError::Config(format!("{} must be set in environment", name)),
        envs::Error::WrongFormat(name) => AppError::Config(format!("{} must be a valid number", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            secret_key: "test-secret-key-must-be-at-least-32-characters-long!".to_string(),
            access_token_expire_minutes: DEFAULT_TOKEN_EXPIRE_MINUTES,
            password_hash_rounds: MIN_HASH_ROUNDS,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let config = Config {
            secret_key: "too-short".to_string(),
            ..valid_config()
        };

        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_expiry_out_of_range_is_rejected() {
        for minutes in [0, -5, MAX_TOKEN_EXPIRE_MINUTES + 1] {
            let config = Config {
                access_token_expire_minutes: minutes,
                ..valid_config()
            };
            assert!(config.validate().is_err(), "{minutes} should be rejected");
        }
    }

    #[test]
    fn test_too_few_hash_rounds_is_rejected() {
        let config = Config {
            password_hash_rounds: 10,
            ..valid_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_ttl() {
        assert_eq!(valid_config().token_ttl(), Duration::minutes(60));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = valid_config();
        let printed = format!("{config:?}");

        assert!(printed.contains("***"));
        assert!(!printed.contains(&config.secret_key));
    }
}
