//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::{
    FatigueStore, MemoryStore, PgFatigueRepository, PgTemperatureRepository, PgUserRepository,
    TemperatureStore, UserStore,
};
use crate::services::auth::TokenKeys;
use crate::storage::{ImageStore, LocalDiskStore};

/// The three record stores plus the pool behind them, if any.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub readings: Arc<dyn TemperatureStore>,
    pub fatigue: Arc<dyn FatigueStore>,
    /// `None` when running on the in-memory store.
    pub pool: Option<PgPool>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            readings: Arc::new(PgTemperatureRepository::new(pool.clone())),
            fatigue: Arc::new(PgFatigueRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Process-local stores.
    #[must_use]
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            readings: Arc::new(store.clone()),
            fatigue: Arc::new(store),
            pool: None,
        }
    }
}

/// Everything needed to build an [`AppState`].
pub struct StateParts {
    pub stores: Stores,
    pub images: Arc<dyn ImageStore>,
    pub tokens: TokenKeys,
    /// Base URL for stored photo links, without trailing slash.
    pub public_url: String,
    pub max_upload_bytes: usize,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the record stores and signing keys.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<StateParts>,
}

impl AppState {
    /// Create application state from configuration and stores. Images go to
    /// the configured upload directory.
    #[must_use]
    pub fn new(config: &ApiConfig, stores: Stores) -> Self {
        Self::from_parts(StateParts {
            stores,
            images: Arc::new(LocalDiskStore::new(config.uploads.dir.clone())),
            tokens: TokenKeys::from_config(&config.auth),
            public_url: config.public_url.clone(),
            max_upload_bytes: config.uploads.max_bytes,
        })
    }

    /// Create application state from explicit parts.
    #[must_use]
    pub fn from_parts(parts: StateParts) -> Self {
        Self {
            inner: Arc::new(parts),
        }
    }

    /// Account store.
    #[must_use]
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.inner.stores.users
    }

    /// Temperature reading store.
    #[must_use]
    pub fn readings(&self) -> &dyn TemperatureStore {
        self.inner.stores.readings.as_ref()
    }

    /// Fatigue snapshot store.
    #[must_use]
    pub fn fatigue(&self) -> &dyn FatigueStore {
        self.inner.stores.fatigue.as_ref()
    }

    /// Snapshot image store.
    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.inner.images.as_ref()
    }

    /// Token signing keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// Database pool, if running on `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.stores.pool.as_ref()
    }

    /// Public URL of a stored image.
    #[must_use]
    pub fn photo_url(&self, key: &str) -> String {
        format!("{}/uploads/{key}", self.inner.public_url)
    }

    /// Snapshot size limit in bytes.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes
    }
}
