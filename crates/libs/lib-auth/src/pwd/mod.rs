//! # Password Hashing
//!
//! Password credentials are PBKDF2-HMAC-SHA256 digests stored in PHC string format:
//!
//! ```text
//! $pbkdf2-sha256$i=600000,l=32$<salt>$<digest>
//! ```
//!
//! Verification also accepts two older encodings so existing rows keep working:
//! Argon2 PHC strings and passlib's `$pbkdf2-sha256$<rounds>$<ab64 salt>$<ab64 digest>`.
//! [`CredentialHasher::needs_rehash`] reports those so they can be upgraded on
//! the next successful sign-in.

use std::fmt;

use argon2::{
    password_hash::{
        rand_core::OsRng, Output, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use pbkdf2::{Params, Pbkdf2};
use sha2::Sha256;

use crate::error::{AuthError, Result};

pub const DEFAULT_ROUNDS: u32 = 600_000;

const PBKDF2_SHA256: &str = "pbkdf2-sha256";
const ARGON2_IDENTS: [&str; 3] = ["argon2id", "argon2i", "argon2d"];
const DIGEST_LEN: usize = 32;

/// Stored one-way password hash, with its algorithm, parameters and salt.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Credential {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Keep digests out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"***").finish()
    }
}

/// PBKDF2-SHA256 password hasher.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    rounds: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

impl CredentialHasher {
    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Password strength is not checked here; callers validate complexity first.
    pub fn hash(&self, plaintext: &str) -> Result<Credential> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params {
            rounds: self.rounds,
            output_length: DIGEST_LEN,
        };

        let hash = Pbkdf2
            .hash_password_customized(plaintext.as_bytes(), None, None, params, &salt)
            .map_err(|e| AuthError::Validation(format!("Failed to hash password: {}", e)))?;

        Ok(Credential(hash.to_string()))
    }

    /// Verify a plaintext password against a stored credential.
    ///
    /// Digests are compared in constant time. Malformed credentials yield `false`.
    pub fn verify(&self, credential: &str, plaintext: &str) -> bool {
        if let Some(legacy) = PasslibPbkdf2::parse(credential) {
            return legacy.verify(plaintext);
        }

        match PasswordHash::new(credential) {
            Ok(parsed) => {
                let argon2 = Argon2::default();
                let verifiers: [&dyn PasswordVerifier; 2] = [&Pbkdf2, &argon2];
                parsed.verify_password(&verifiers, plaintext).is_ok()
            }
            Err(_) => false,
        }
    }

    /// Best-effort check that `value` is an encoded credential rather than plaintext.
    pub fn is_hashed(value: &str) -> bool {
        if PasslibPbkdf2::parse(value).is_some() {
            return true;
        }

        match PasswordHash::new(value) {
            Ok(parsed) => {
                let ident = parsed.algorithm.as_str();
                (ident == PBKDF2_SHA256 || ARGON2_IDENTS.contains(&ident)) && parsed.hash.is_some()
            }
            Err(_) => false,
        }
    }

    /// True when the credential should be replaced by a fresh [`hash`](Self::hash):
    /// older encodings, other algorithms, or fewer rounds than configured.
    pub fn needs_rehash(&self, credential: &str) -> bool {
        if PasslibPbkdf2::parse(credential).is_some() {
            return true;
        }

        let Ok(parsed) = PasswordHash::new(credential) else {
            return true;
        };

        if parsed.algorithm.as_str() != PBKDF2_SHA256 {
            return true;
        }

        match parsed.params.get_decimal("i") {
            Some(rounds) => rounds < self.rounds,
            None => true,
        }
    }
}

/// Credential in the format written by passlib's `pbkdf2_sha256` handler.
struct PasslibPbkdf2 {
    rounds: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl PasslibPbkdf2 {
    fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split('$');

        if parts.next() != Some("") || parts.next() != Some(PBKDF2_SHA256) {
            return None;
        }

        let rounds = parts.next()?.parse::<u32>().ok().filter(|r| *r > 0)?;
        let salt = lib_utils::ab64_decode(parts.next()?).ok()?;
        let digest = lib_utils::ab64_decode(parts.next()?).ok()?;

        if parts.next().is_some() || digest.len() != DIGEST_LEN {
            return None;
        }

        Some(Self { rounds, salt, digest })
    }

    fn verify(&self, plaintext: &str) -> bool {
        let mut computed = [0u8; DIGEST_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(plaintext.as_bytes(), &self.salt, self.rounds, &mut computed);

        // Output's equality is constant-time.
        match (Output::new(&computed), Output::new(&self.digest)) {
            (Ok(computed), Ok(expected)) => computed == expected,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(1_000)
    }

    #[test]
    fn test_hash_then_verify() {
        let credential = hasher().hash("Password1!").expect("hashing should succeed");

        assert!(credential.as_str().starts_with("$pbkdf2-sha256$"));
        assert!(credential.as_str().contains("i=1000"));
        assert!(hasher().verify(credential.as_str(), "Password1!"));
        assert!(!hasher().verify(credential.as_str(), "password1!"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hasher().hash("TestPassword123!").expect("hash");
        let second = hasher().hash("TestPassword123!").expect("hash");

        assert_ne!(first, second);
        assert!(hasher().verify(first.as_str(), "TestPassword123!"));
        assert!(hasher().verify(second.as_str(), "TestPassword123!"));
    }

    #[test]
    fn test_weak_and_empty_passwords_still_hash() {
        for plaintext in ["", "a", "short"] {
            let credential = hasher().hash(plaintext).expect("weak input is not rejected here");
            assert!(hasher().verify(credential.as_str(), plaintext));
        }
    }

    #[test]
    fn test_verify_malformed_credential_is_false() {
        for stored in ["", "plaintext", "$pbkdf2-sha256$", "$pbkdf2-sha256$x$y$z", "$unknown$abc"] {
            assert!(!hasher().verify(stored, "Password1!"), "{stored:?} should not verify");
        }
    }

    #[test]
    fn test_verify_is_independent_of_configured_rounds() {
        let credential = CredentialHasher::new(2_000).hash("Password1!").expect("hash");

        assert!(CredentialHasher::new(1_000).verify(credential.as_str(), "Password1!"));
    }

    #[test]
    fn test_verify_legacy_argon2_credential() {
        let salt = SaltString::generate(&mut OsRng);
        let legacy = Argon2::default()
            .hash_password(b"TestPassword123!", &salt)
            .expect("argon2 hash")
            .to_string();

        assert!(hasher().verify(&legacy, "TestPassword123!"));
        assert!(!hasher().verify(&legacy, "WrongPassword"));
        assert!(hasher().needs_rehash(&legacy));
    }

    #[test]
    fn test_verify_passlib_credential() {
        let salt = b"0123456789abcdef";
        let mut digest = [0u8; DIGEST_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(b"pass321S#", salt, 1_000, &mut digest);
        let stored = format!(
            "$pbkdf2-sha256$1000${}${}",
            lib_utils::ab64_encode(salt),
            lib_utils::ab64_encode(digest)
        );

        assert!(CredentialHasher::is_hashed(&stored));
        assert!(hasher().verify(&stored, "pass321S#"));
        assert!(!hasher().verify(&stored, "pass321S"));
        assert!(hasher().needs_rehash(&stored));
    }

    #[test]
    fn test_is_hashed() {
        let credential = hasher().hash("Password1!").expect("hash");

        assert!(CredentialHasher::is_hashed(credential.as_str()));
        assert!(!CredentialHasher::is_hashed("Password1!"));
        assert!(!CredentialHasher::is_hashed("$2b$12$notbcryptsupported"));
    }

    #[test]
    fn test_needs_rehash_on_fewer_rounds() {
        let weak = CredentialHasher::new(1_000).hash("Password1!").expect("hash");

        assert!(CredentialHasher::new(2_000).needs_rehash(weak.as_str()));
        assert!(!CredentialHasher::new(1_000).needs_rehash(weak.as_str()));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = hasher().hash("Password1!").expect("hash");

        assert_eq!(format!("{credential:?}"), "Credential(\"***\")");
    }
}
