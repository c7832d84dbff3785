//! # Bearer Token Management
//!
//! Stateless HS256 JWTs carrying an identity reference (`sub`) and an expiry
//! (`exp`). Nothing is stored server-side: a token stays valid until it expires.
//!
//! Expiry is checked against the injected [`Clock`] with no leeway, so a token is
//! valid while `now < exp` and expired from `exp` on.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{AuthError, Result};

/// The identity reference a token proves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    pub sub: String,
}

impl IdentityClaim {
    pub fn new(sub: impl Into<String>) -> Self {
        Self { sub: sub.into() }
    }
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (admin ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates bearer tokens with a server-held symmetric key.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Build a service from the signing secret.
    ///
    /// Fails if the secret is empty or the default ttl is not positive.
    pub fn new(secret: &str, default_ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        if secret.is_empty() {
            return Err(AuthError::Validation("Token signing secret is not set".to_string()));
        }
        ensure_positive(default_ttl)?;

        // Expiry is checked by hand against the injected clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["sub".to_string(), "exp".to_string()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
            clock,
        })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign a token for `claim`, valid for `ttl` (or the default ttl).
    pub fn issue(&self, claim: &IdentityClaim, ttl: Option<Duration>) -> Result<IssuedToken> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        ensure_positive(ttl)?;

        let now = self.clock.now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Validation("Token expiry out of range".to_string()))?
            .timestamp();
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AuthError::Validation("Token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: claim.sub.clone(),
            exp,
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode JWT: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, shape and expiry, returning the embedded identity.
    pub fn validate(&self, token: &str) -> Result<IdentityClaim> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to decode JWT: {}", e)))?;
        let claims = token_data.claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(AuthError::InvalidToken("Token has expired".to_string()));
        }

        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("Token has no subject".to_string()));
        }

        Ok(IdentityClaim { sub: claims.sub })
    }
}

fn ensure_positive(ttl: Duration) -> Result<()> {
    if ttl <= Duration::zero() {
        return Err(AuthError::Validation("Token ttl must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;
    use crate::clock::SystemClock;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    const SECRET: &str = "test-secret-key-must-be-at-least-32-chars-long!";

    fn service_at(clock: Arc<ManualClock>) -> TokenService {
        TokenService::new(SECRET, Duration::minutes(60), clock).expect("service")
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    #[test]
    fn test_issue_then_validate() {
        let service = TokenService::new(SECRET, Duration::minutes(60), Arc::new(SystemClock))
            .expect("service");

        let issued = service.issue(&IdentityClaim::new("1"), None).expect("issue");
        let claim = service.validate(&issued.token).expect("validate");

        assert_eq!(claim.sub, "1");
    }

    #[test]
    fn test_token_lifecycle_with_clock() {
        let clock = Arc::new(ManualClock::new(t0()));
        let service = service_at(clock.clone());

        let issued = service
            .issue(&IdentityClaim::new("42"), Some(Duration::minutes(60)))
            .expect("issue");
        assert_eq!(issued.expires_at, t0() + Duration::minutes(60));

        clock.advance(Duration::minutes(30));
        assert_eq!(service.validate(&issued.token).expect("still valid").sub, "42");

        clock.advance(Duration::minutes(31));
        assert!(matches!(
            service.validate(&issued.token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_expires_exactly_at_expiry() {
        let clock = Arc::new(ManualClock::new(t0()));
        let service = service_at(clock.clone());
        let issued = service
            .issue(&IdentityClaim::new("7"), Some(Duration::seconds(10)))
            .expect("issue");

        clock.advance(Duration::seconds(9));
        assert!(service.validate(&issued.token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(service.validate(&issued.token).is_err());
    }

    #[test]
    fn test_altered_signature_fails() {
        let clock = Arc::new(ManualClock::new(t0()));
        let service = service_at(clock);
        let issued = service.issue(&IdentityClaim::new("42"), None).expect("issue");

        let (unsigned, signature) = issued.token.rsplit_once('.').expect("jwt has a signature");
        let mut sig: Vec<char> = signature.chars().collect();
        let i = sig.len() / 2;
        sig[i] = if sig[i] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", unsigned, sig.into_iter().collect::<String>());

        assert!(matches!(
            service.validate(&tampered),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_forged_payload_with_original_signature_fails() {
        let service = service_at(Arc::new(ManualClock::new(t0())));
        let issued = service.issue(&IdentityClaim::new("1"), None).expect("issue");

        let mut parts = issued.token.split('.');
        let (header, payload, signature) = (
            parts.next().expect("header"),
            parts.next().expect("payload"),
            parts.next().expect("signature"),
        );
        let claims = String::from_utf8(URL_SAFE_NO_PAD.decode(payload).expect("payload is base64url"))
            .expect("payload is utf-8");
        assert!(claims.contains(r#""sub":"1""#));

        let forged = URL_SAFE_NO_PAD.encode(claims.replace(r#""sub":"1""#, r#""sub":"2""#));
        let tampered = format!("{}.{}.{}", header, forged, signature);

        assert!(matches!(
            service.validate(&tampered),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_huge_ttl_is_rejected() {
        let service = service_at(Arc::new(ManualClock::new(t0())));

        assert!(matches!(
            service.issue(&IdentityClaim::new("1"), Some(Duration::MAX)),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_token_from_other_secret_fails() {
        let clock = Arc::new(ManualClock::new(t0()));
        let other = TokenService::new("another-secret-key-at-least-32-characters", Duration::minutes(60), clock.clone())
            .expect("service");
        let issued = other.issue(&IdentityClaim::new("42"), None).expect("issue");

        assert!(service_at(clock).validate(&issued.token).is_err());
    }

    #[test]
    fn test_malformed_token_fails() {
        let service = service_at(Arc::new(ManualClock::new(t0())));

        for token in ["", "not-a-jwt", "a.b.c"] {
            assert!(matches!(
                service.validate(token),
                Err(AuthError::InvalidToken(_))
            ));
        }
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = TokenService::new("", Duration::minutes(60), Arc::new(SystemClock));

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let service = service_at(Arc::new(ManualClock::new(t0())));

        assert!(matches!(
            service.issue(&IdentityClaim::new("1"), Some(Duration::zero())),
            Err(AuthError::Validation(_))
        ));
    }
}
