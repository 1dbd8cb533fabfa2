//! Storage for fatigue snapshot images.
//!
//! Images are written under the configured upload directory with a
//! generated key (`fatiga_<millis>_<uuid>.<ext>`) and served back from
//! `/uploads/<key>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Image formats accepted for fatigue snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Detect the kind from a filename and MIME type. Both must agree on an
    /// allowed format.
    #[must_use]
    pub fn detect(file_name: &str, content_type: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)?;
        let from_ext = match ext.as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            _ => return None,
        };
        let from_mime = match content_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            _ => return None,
        };
        (from_ext == from_mime).then_some(from_ext)
    }

    /// File extension used for stored objects.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Errors from the image store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Where snapshot images live.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes` and return the generated storage key.
    async fn put(&self, kind: ImageKind, bytes: &[u8]) -> Result<String, StorageError>;

    /// Remove a stored image.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Generate a storage key for a new snapshot.
#[must_use]
pub fn new_storage_key(kind: ImageKind) -> String {
    format!(
        "fatiga_{}_{}.{}",
        Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple(),
        kind.extension()
    )
}

/// Images on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory images are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ImageStore for LocalDiskStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, kind: ImageKind, bytes: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let key = new_storage_key(kind);
        tokio::fs::write(self.path_for(&key)?, bytes).await?;
        debug!(key = %key, "Stored snapshot image");
        Ok(key)
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        tokio::fs::remove_file(self.path_for(key)?).await?;
        Ok(())
    }
}
