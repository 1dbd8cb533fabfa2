//! Persistence for the ShiftWatch API.
//!
//! # Database: `shiftwatch`
//!
//! ## Tables
//!
//! - `users` - Accounts (email unique, argon2 hash, avatar preference)
//! - `temperature_readings` - Device samples, owned by a user
//! - `fatigue_events` - Camera snapshots, owned by a user
//!
//! Every query is scoped to the owning user. Handlers talk to the
//! [`UserStore`], [`TemperatureStore`] and [`FatigueStore`] traits; the
//! `Pg*` repositories back them in production and [`MemoryStore`] backs
//! tests and `--in-memory` runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p shiftwatch-cli -- migrate
//! ```

pub mod fatigue;
pub mod memory;
pub mod temperature;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shiftwatch_core::{
    FatigueEvent, FatigueEventId, NewReading, NewSnapshot, PageRequest, TemperatureReading,
    TemperatureReadingId, UserId,
};

use crate::models::{NewUser, ProfileUpdate, User};

pub use fatigue::PgFatigueRepository;
pub use memory::MemoryStore;
pub use temperature::PgTemperatureRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-index violation to [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account.
    ///
    /// Returns [`RepositoryError::Conflict`] if the email is taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Look up an account by exact email.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Overwrite the editable profile fields. `None` if the account is gone.
    ///
    /// Returns [`RepositoryError::Conflict`] if the new email is taken.
    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError>;
}

/// Temperature reading storage. Lists are newest first.
#[async_trait]
pub trait TemperatureStore: Send + Sync {
    /// Insert a reading for `owner`.
    async fn insert(
        &self,
        owner: UserId,
        reading: &NewReading,
        fan_engaged: bool,
        recorded_at: DateTime<Utc>,
    ) -> Result<TemperatureReading, RepositoryError>;

    /// One page of `owner`'s readings, optionally for a single device,
    /// together with the total number of matching rows.
    async fn list(
        &self,
        owner: UserId,
        device_id: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<TemperatureReading>, u64), RepositoryError>;

    /// A single reading.
    async fn get(
        &self,
        owner: UserId,
        id: TemperatureReadingId,
    ) -> Result<Option<TemperatureReading>, RepositoryError>;

    /// The newest reading reported by `device_id`.
    async fn latest_for_device(
        &self,
        owner: UserId,
        device_id: &str,
    ) -> Result<Option<TemperatureReading>, RepositoryError>;

    /// Delete a reading. `false` if nothing matched.
    async fn delete(
        &self,
        owner: UserId,
        id: TemperatureReadingId,
    ) -> Result<bool, RepositoryError>;
}

/// Fatigue snapshot storage. Lists are newest first.
#[async_trait]
pub trait FatigueStore: Send + Sync {
    /// Insert a snapshot for `owner`.
    async fn insert(
        &self,
        owner: UserId,
        snapshot: &NewSnapshot,
        photo_url: &str,
        storage_key: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> Result<FatigueEvent, RepositoryError>;

    /// All of `owner`'s snapshots.
    async fn list(&self, owner: UserId) -> Result<Vec<FatigueEvent>, RepositoryError>;

    /// Delete a snapshot, returning the removed row so its image can be
    /// cleaned up.
    async fn delete(
        &self,
        owner: UserId,
        id: FatigueEventId,
    ) -> Result<Option<FatigueEvent>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
