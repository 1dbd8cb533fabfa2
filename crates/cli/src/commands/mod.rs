//! CLI command implementations.

pub mod dashboard;
pub mod fatigue;
pub mod migrate;
pub mod session;
pub mod temperature;
pub mod theme;
pub mod user;

use shiftwatch_client::{ClientConfig, CredentialStore, FetchError, ShiftWatchClient};

/// Errors shared by the API-facing commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] shiftwatch_client::ConfigError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Could not read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("Not signed in. Run `shiftwatch-cli login` first.")]
    NotSignedIn,
}

/// Loaded configuration plus a client bound to the saved session.
pub struct Context {
    pub config: ClientConfig,
    pub client: ShiftWatchClient,
}

impl Context {
    /// Build the context from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is malformed.
    pub fn from_env() -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        let credentials = CredentialStore::file(config.session_file());
        let client = ShiftWatchClient::new(&config, credentials)?;
        Ok(Self { config, client })
    }

    pub const fn credentials(&self) -> &CredentialStore {
        self.client.credentials()
    }
}

/// Parse a numeric id argument.
pub fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.parse().map_err(|_| CommandError::InvalidId(raw.to_owned()))
}
