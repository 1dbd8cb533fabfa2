//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHIFTWATCH_API_URL` - Base URL of the API (default: `http://127.0.0.1:5000`)
//! - `SHIFTWATCH_STATE_DIR` - Directory holding the saved session (default: `.shiftwatch`)
//! - `SHIFTWATCH_POLL_SECS` - Dashboard refresh interval in seconds (default: 10)
//! - `SHIFTWATCH_UTC_OFFSET_HOURS` - Display time zone offset (default: -5, Lima)
//! - `SHIFTWATCH_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL
    pub api_url: Url,
    /// Directory for the persisted session file
    pub state_dir: PathBuf,
    /// Live data refresh interval
    pub poll_interval: Duration,
    /// Time zone used for chart labels and the clock line
    pub display_offset: FixedOffset,
    /// Per-request timeout
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| unreachable!()),
            state_dir: PathBuf::from(".shiftwatch"),
            poll_interval: Duration::from_secs(10),
            display_offset: lima_offset(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// UTC-5, the plant's local time.
fn lima_offset() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap_or_else(|| unreachable!())
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = get_env_or_default("SHIFTWATCH_API_URL", DEFAULT_API_URL);
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SHIFTWATCH_API_URL".to_string(), e.to_string()))?;

        let poll_secs: u64 = parse_env("SHIFTWATCH_POLL_SECS", "10")?;
        if poll_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHIFTWATCH_POLL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let offset_hours: i32 = parse_env("SHIFTWATCH_UTC_OFFSET_HOURS", "-5")?;
        let display_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "SHIFTWATCH_UTC_OFFSET_HOURS".to_string(),
                    format!("offset out of range: {offset_hours}"),
                )
            })?;

        let timeout_secs: u64 = parse_env("SHIFTWATCH_HTTP_TIMEOUT_SECS", "30")?;

        Ok(Self {
            api_url,
            state_dir: PathBuf::from(get_env_or_default("SHIFTWATCH_STATE_DIR", ".shiftwatch")),
            poll_interval: Duration::from_secs(poll_secs),
            display_offset,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Path of the session file inside the state directory.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.display_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(config.session_file(), PathBuf::from(".shiftwatch/session.json"));
    }

    #[test]
    fn test_parse_env_reports_key() {
        let err = parse_env::<u64>("SHIFTWATCH_TEST_UNSET_KEY_FOR_PARSE", "abc").unwrap_err();
        assert!(err.to_string().contains("SHIFTWATCH_TEST_UNSET_KEY_FOR_PARSE"));
    }
}
