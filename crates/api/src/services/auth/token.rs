//! Bearer token issuing and verification (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shiftwatch_core::UserId;

use crate::config::AuthConfig;

/// Why a presented token was rejected.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token subject is not a user id: {0}")]
    BadSubject(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id as a decimal string.
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signing and verification keys plus token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenKeys {
    /// Build keys from an HMAC secret.
    #[must_use]
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Build keys from the auth configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::from_secret(
            config.jwt_secret.expose_secret().as_bytes(),
            Duration::hours(config.token_ttl_hours),
        )
    }

    /// Issue a token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns the signing error if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify a token and return its subject.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the signature, expiry or subject is invalid.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?;
        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::BadSubject(data.claims.sub))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"k3Y-for-tests-0nly-9f8e7d6c5b4a3210";

    #[test]
    fn test_issue_then_verify() {
        let keys = TokenKeys::from_secret(SECRET, Duration::hours(24));
        let token = keys.issue(UserId::new(12)).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), UserId::new(12));
    }

    #[test]
    fn test_rejects_other_secret() {
        let keys = TokenKeys::from_secret(SECRET, Duration::hours(24));
        let other = TokenKeys::from_secret(b"a-completely-different-signing-key", Duration::hours(24));
        let token = other.issue(UserId::new(1)).unwrap();
        assert!(matches!(keys.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired() {
        let keys = TokenKeys::from_secret(SECRET, Duration::hours(-1));
        let token = keys.issue(UserId::new(1)).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        let keys = TokenKeys::from_secret(SECRET, Duration::hours(24));
        assert!(keys.verify("not.a.token").is_err());
    }
}
