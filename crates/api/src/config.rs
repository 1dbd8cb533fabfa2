//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHIFTWATCH_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`);
//!   optional with [`StoreMode::InMemory`]
//! - `SHIFTWATCH_JWT_SECRET` - HS256 signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SHIFTWATCH_HOST` - Bind address (default: 127.0.0.1)
//! - `SHIFTWATCH_PORT` - Listen port (default: 5000)
//! - `SHIFTWATCH_PUBLIC_URL` - Base URL used in stored photo links (default: `http://{host}:{port}`)
//! - `SHIFTWATCH_UPLOAD_DIR` - Directory for fatigue snapshots (default: uploads)
//! - `SHIFTWATCH_MAX_UPLOAD_BYTES` - Snapshot size limit (default: 5 MiB)
//! - `SHIFTWATCH_TOKEN_TTL_HOURS` - Bearer token lifetime (default: 24)
//! - `SHIFTWATCH_CORS_ORIGINS` - Comma-separated allowed origins
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DATABASE_URL_KEY: &str = "SHIFTWATCH_DATABASE_URL";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where the server keeps its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// `PostgreSQL`; a database URL is required.
    Postgres,
    /// Throwaway in-process store (`--in-memory`).
    InMemory,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password). Always set
    /// for [`StoreMode::Postgres`].
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub public_url: String,
    /// Token signing configuration
    pub auth: AuthConfig,
    /// Snapshot storage configuration
    pub uploads: UploadConfig,
    /// Origins allowed by CORS (empty = same-origin only)
    pub cors_origins: Vec<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Bearer token configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: SecretString,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Fatigue snapshot storage configuration.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory snapshots are written to and served from
    pub dir: PathBuf,
    /// Maximum accepted file size in bytes
    pub max_bytes: usize,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (placeholder detection, entropy check).
    pub fn from_env(mode: StoreMode) -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = require_database_url(mode, find_database_url())?;
        let host = parse_env("SHIFTWATCH_HOST", "127.0.0.1")?;
        let port = parse_env("SHIFTWATCH_PORT", "5000")?;
        let public_url = get_optional_env("SHIFTWATCH_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_owned();
        url::Url::parse(&public_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHIFTWATCH_PUBLIC_URL".to_owned(), e.to_string())
        })?;

        let jwt_secret = get_validated_secret("SHIFTWATCH_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "SHIFTWATCH_JWT_SECRET")?;
        let token_ttl_hours = parse_env("SHIFTWATCH_TOKEN_TTL_HOURS", "24")?;

        let uploads = UploadConfig {
            dir: PathBuf::from(get_env_or_default("SHIFTWATCH_UPLOAD_DIR", "uploads")),
            max_bytes: parse_env(
                "SHIFTWATCH_MAX_UPLOAD_BYTES",
                &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
            )?,
        };

        let cors_origins = get_optional_env("SHIFTWATCH_CORS_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or_default();

        Ok(Self {
            database_url,
            host,
            port,
            public_url,
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
            uploads,
            cors_origins,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Database URL with fallback to generic `DATABASE_URL`.
fn find_database_url() -> Option<SecretString> {
    get_optional_env(DATABASE_URL_KEY)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Only the Postgres store needs a database URL.
fn require_database_url(
    mode: StoreMode,
    found: Option<SecretString>,
) -> Result<Option<SecretString>, ConfigError> {
    match (mode, found) {
        (StoreMode::Postgres, None) => {
            Err(ConfigError::MissingEnvVar(DATABASE_URL_KEY.to_owned()))
        }
        (_, found) => Ok(found),
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated origin list, dropping blanks.
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_edges() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("changeme-jwt-key-0123456789abcdef", "JWT").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(20), "JWT");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "JWT");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "JWT").is_err());
        assert!(validate_secret_length(&SecretString::from("k".repeat(32)), "JWT").is_ok());
    }

    #[test]
    fn test_database_url_only_required_for_postgres() {
        let err = require_database_url(StoreMode::Postgres, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == DATABASE_URL_KEY));

        assert!(require_database_url(StoreMode::InMemory, None).unwrap().is_none());

        let url = require_database_url(
            StoreMode::Postgres,
            Some(SecretString::from("postgres://localhost/shiftwatch")),
        )
        .unwrap()
        .unwrap();
        assert_eq!(url.expose_secret(), "postgres://localhost/shiftwatch");
    }

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins(" http://localhost:19006 , ,https://wokwi.com"),
            vec!["http://localhost:19006", "https://wokwi.com"]
        );
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let auth = AuthConfig {
            jwt_secret: SecretString::from("super_secret_signing_key"),
            token_ttl_hours: 24,
        };
        let debug_output = format!("{auth:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_signing_key"));
    }
}
