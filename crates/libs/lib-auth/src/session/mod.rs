//! # Sign-in and Request Authentication
//!
//! [`Authenticator`] glues the [`CredentialHasher`] and [`TokenService`] to a
//! [`UserDirectory`]. Every failure a client could use to probe accounts
//! (unknown username, wrong password, bad or expired token, deleted account)
//! comes back as the same [`AuthError::Unauthorized`]; the specific reason only
//! goes to the log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{AuthError, DirectoryError, Result};
use crate::pwd::{Credential, CredentialHasher};
use crate::token::{IdentityClaim, TokenService};

/// Fields of a directory record the auth flow needs.
pub trait IdentityRecord {
    fn id(&self) -> i64;
    fn username(&self) -> &str;
    fn credential(&self) -> &str;
}

/// Lookup side of the account store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    type Record: IdentityRecord + Send;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> std::result::Result<Option<Self::Record>, DirectoryError>;

    async fn find_by_id(&self, id: i64) -> std::result::Result<Option<Self::Record>, DirectoryError>;
}

/// Outcome of a successful sign-in.
#[derive(Debug)]
pub struct SignedIn<R> {
    pub record: R,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Replacement for an outdated stored credential, to be persisted by the caller.
    pub upgraded_credential: Option<Credential>,
}

pub struct Authenticator<D> {
    directory: D,
    hasher: CredentialHasher,
    tokens: TokenService,
    dummy_credential: Credential,
}

impl<D: UserDirectory> Authenticator<D> {
    pub fn new(directory: D, hasher: CredentialHasher, tokens: TokenService) -> Result<Self> {
        // Verified against when the username is unknown, so both paths cost one KDF run.
        let dummy_credential = hasher.hash("dummy-password-for-unknown-users")?;

        Ok(Self {
            directory,
            hasher,
            tokens,
            dummy_credential,
        })
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Check a username/password pair and mint a token for it.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignedIn<D::Record>> {
        let record = self
            .directory
            .find_by_username(username)
            .await
            .map_err(AuthError::Directory)?;

        let Some(record) = record else {
            self.verify_blocking(self.dummy_credential.as_str(), password)
                .await?;
            warn!("[SIGN IN] Unknown username: {}", username);
            return Err(AuthError::Unauthorized);
        };

        if !self.verify_blocking(record.credential(), password).await? {
            warn!("[SIGN IN] Invalid password for: {}", username);
            return Err(AuthError::Unauthorized);
        }

        let upgraded_credential = if self.hasher.needs_rehash(record.credential()) {
            debug!("[SIGN IN] Stored credential for {} is outdated, rehashing", username);
            Some(self.hash_blocking(password).await?)
        } else {
            None
        };

        let issued = self.tokens.issue(&IdentityClaim::new(record.id().to_string()), None)?;
        debug!("[SIGN IN] Token issued for {} (id: {})", record.username(), record.id());

        Ok(SignedIn {
            record,
            token: issued.token,
            expires_at: issued.expires_at,
            upgraded_credential,
        })
    }

    /// Resolve a bearer token back to its directory record.
    pub async fn authenticate(&self, token: &str) -> Result<D::Record> {
        let claim = self.tokens.validate(token).map_err(|e| {
            warn!("[AUTH] Token rejected: {}", e);
            AuthError::Unauthorized
        })?;

        let id = claim.sub.parse::<i64>().map_err(|_| {
            warn!("[AUTH] Token subject is not an id: {}", claim.sub);
            AuthError::Unauthorized
        })?;

        match self.directory.find_by_id(id).await.map_err(AuthError::Directory)? {
            Some(record) => Ok(record),
            None => {
                warn!("[AUTH] Token subject no longer exists: {}", id);
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Mint a token for a record that was just created.
    pub fn issue_for(&self, record: &D::Record) -> Result<crate::token::IssuedToken> {
        self.tokens.issue(&IdentityClaim::new(record.id().to_string()), None)
    }

    /// Hash a password off the async executor.
    pub async fn hash_blocking(&self, password: &str) -> Result<Credential> {
        let hasher = self.hasher;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_blocking(&self, credential: &str, password: &str) -> Result<bool> {
        let hasher = self.hasher;
        let credential = credential.to_string();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&credential, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))
    }
}
