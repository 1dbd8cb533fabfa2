//! ShiftWatch client library.
//!
//! Talks to the ShiftWatch API on behalf of a signed-in user and turns the
//! responses into what the dashboard screens show.
//!
//! # Modules
//!
//! - [`credential_store`] - Persisted token, profile and theme
//! - [`fetcher`] - Bearer-token dispatch and session expiry
//! - [`client`] - Typed API operations
//! - [`polling`] - Single-flight interval refresh
//! - [`projection`] - Pure view math (averages, chart, pages, avatars)
//! - [`dashboard`] - Dashboard state and text rendering
//!
//! # Example
//!
//! ```rust,ignore
//! use shiftwatch_client::{ClientConfig, CredentialStore, ShiftWatchClient};
//!
//! let config = ClientConfig::from_env()?;
//! let client = ShiftWatchClient::new(&config, CredentialStore::file(config.session_file()))?;
//! client.login("ana.rojas", "Planta_2024").await?;
//! let page = client.list_temperature(1, 10).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod credential_store;
pub mod dashboard;
pub mod fetcher;
pub mod polling;
pub mod projection;

pub use client::{ShiftWatchClient, SnapshotUpload};
pub use config::{ClientConfig, ConfigError};
pub use credential_store::{CredentialStore, FileStore, KeyValueStore, MemoryKv, Session, Theme};
pub use dashboard::{DashboardView, LiveData};
pub use fetcher::{FetchError, SessionEvent};
pub use polling::PollHandle;
