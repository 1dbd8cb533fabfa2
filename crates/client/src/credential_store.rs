//! Persisted session state: bearer token, signed-in profile and theme.
//!
//! The store is fail-open towards "logged out": any read or write problem is
//! logged and treated as an absent entry, so a corrupt session file never
//! wedges the client.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use shiftwatch_core::UserProfile;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the JSON-encoded profile.
pub const USER_KEY: &str = "user";
/// Key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Minimal string key-value storage.
///
/// `set_many`/`remove_many` apply all entries in one write so a session is
/// never observed half-saved.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), KvError>;

    async fn remove_many(&self, keys: &[&str]) -> Result<(), KvError>;

    async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        self.set_many(&[(key, value)]).await
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        self.remove_many(&[key]).await
    }
}

/// In-memory backend, used by tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), KvError> {
        let mut map = self.entries.lock().await;
        for (key, value) in entries {
            map.insert((*key).to_owned(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), KvError> {
        let mut map = self.entries.lock().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON-file backend. The whole map is rewritten on every change, through a
/// temp file and rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<HashMap<String, String>, KvError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<(), KvError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(map)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), KvError> {
        let _guard = self.lock.lock().await;
        // A corrupt file is replaced rather than blocking new sessions.
        let mut map = self.read_map().await.unwrap_or_default();
        for (key, value) in entries {
            map.insert((*key).to_owned(), value.clone());
        }
        self.write_map(&map).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), KvError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await.unwrap_or_default();
        for key in keys {
            map.remove(*key);
        }
        self.write_map(&map).await
    }
}

/// Display theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }
}

/// A saved session. Either half may be missing after a partial failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub profile: Option<UserProfile>,
}

impl Session {
    /// Both the token and the profile are present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.token.is_some() && self.profile.is_some()
    }
}

/// Session persistence shared by the fetcher and the views.
///
/// Every mutation goes through one async mutex so a save can't interleave
/// with a concurrent clear.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

struct Inner {
    kv: Box<dyn KeyValueStore>,
    write: Mutex<()>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                kv: Box::new(kv),
                write: Mutex::new(()),
            }),
        }
    }

    /// Store backed by a session file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileStore::new(path))
    }

    /// Store that lives only as long as the process.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MemoryKv::new())
    }

    /// Replace both the token and the profile.
    pub async fn save(&self, token: &str, profile: &UserProfile) {
        let user = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode profile; session not saved");
                return;
            }
        };

        let _guard = self.inner.write.lock().await;
        if let Err(e) = self
            .inner
            .kv
            .set_many(&[(TOKEN_KEY, token.to_owned()), (USER_KEY, user)])
            .await
        {
            tracing::warn!(error = %e, "Failed to save session");
        }
    }

    /// Read the saved session. Unreadable entries come back as `None`.
    pub async fn load(&self) -> Session {
        Session {
            token: self.token().await,
            profile: self.profile().await,
        }
    }

    /// The saved bearer token, if any.
    pub async fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY).await.filter(|t| !t.is_empty())
    }

    /// The saved profile, if any.
    pub async fn profile(&self) -> Option<UserProfile> {
        let raw = self.read(USER_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Stored profile is unreadable; ignoring it");
                None
            }
        }
    }

    /// Forget the token and profile. The theme survives a logout.
    pub async fn clear(&self) {
        let _guard = self.inner.write.lock().await;
        if let Err(e) = self.inner.kv.remove_many(&[TOKEN_KEY, USER_KEY]).await {
            tracing::warn!(error = %e, "Failed to clear session");
        }
    }

    /// Forget the token and profile only while `token` is still the saved
    /// one. Returns `true` when this call ended that session.
    pub async fn clear_if_token(&self, token: &str) -> bool {
        let _guard = self.inner.write.lock().await;
        if self.read(TOKEN_KEY).await.as_deref() != Some(token) {
            return false;
        }
        if let Err(e) = self.inner.kv.remove_many(&[TOKEN_KEY, USER_KEY]).await {
            tracing::warn!(error = %e, "Failed to clear session");
        }
        true
    }

    /// Replace only the profile, after a successful profile edit.
    pub async fn update_profile(&self, profile: &UserProfile) {
        let user = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode profile");
                return;
            }
        };

        let _guard = self.inner.write.lock().await;
        if let Err(e) = self.inner.kv.set(USER_KEY, user).await {
            tracing::warn!(error = %e, "Failed to update stored profile");
        }
    }

    /// The saved theme, dark when unset or unreadable.
    pub async fn load_theme(&self) -> Theme {
        self.read(THEME_KEY)
            .await
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default()
    }

    pub async fn save_theme(&self, theme: Theme) {
        let _guard = self.inner.write.lock().await;
        if let Err(e) = self.inner.kv.set(THEME_KEY, theme.as_str().to_owned()).await {
            tracing::warn!(error = %e, "Failed to save theme");
        }
    }

    /// Flip the theme and persist it. Returns the new theme.
    pub async fn toggle_theme(&self) -> Theme {
        let theme = self.load_theme().await.toggled();
        self.save_theme(theme).await;
        theme
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.inner.kv.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read session store");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shiftwatch_core::{AvatarPreference, Email, UserId};

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            id: UserId::new(7),
            full_name: name.to_owned(),
            phone: "987654321".to_owned(),
            email: Email::parse("rosa@cistcor.com").unwrap(),
            avatar: AvatarPreference::Unspecified,
        }
    }

    #[tokio::test]
    async fn test_empty_store_is_logged_out() {
        let store = CredentialStore::memory();
        let session = store.load().await;
        assert_eq!(session, Session::default());
        assert!(!session.is_complete());
    }

    #[tokio::test]
    async fn test_save_replaces_both_entries() {
        let store = CredentialStore::memory();
        store.save("first-token", &profile("Rosa Diaz")).await;
        store.save("second-token", &profile("Rosa Diaz Peña")).await;

        let session = store.load().await;
        assert_eq!(session.token.as_deref(), Some("second-token"));
        assert_eq!(session.profile.unwrap().full_name, "Rosa Diaz Peña");
    }

    #[tokio::test]
    async fn test_clear_keeps_theme() {
        let store = CredentialStore::memory();
        store.save("token", &profile("Rosa Diaz")).await;
        store.save_theme(Theme::Light).await;

        store.clear().await;

        assert_eq!(store.load().await, Session::default());
        assert_eq!(store.load_theme().await, Theme::Light);
    }

    #[tokio::test]
    async fn test_clear_if_token_only_clears_matching_session() {
        let store = CredentialStore::memory();
        store.save("old-token", &profile("Rosa Diaz")).await;
        store.save("new-token", &profile("Rosa Diaz")).await;

        assert!(!store.clear_if_token("old-token").await);
        assert_eq!(store.token().await.as_deref(), Some("new-token"));

        assert!(store.clear_if_token("new-token").await);
        assert!(!store.clear_if_token("new-token").await);
        assert_eq!(store.load().await, Session::default());
    }

    #[tokio::test]
    async fn test_update_profile_keeps_token() {
        let store = CredentialStore::memory();
        store.save("token", &profile("Rosa Diaz")).await;
        store.update_profile(&profile("Rosa M. Diaz")).await;

        let session = store.load().await;
        assert_eq!(session.token.as_deref(), Some("token"));
        assert_eq!(session.profile.unwrap().full_name, "Rosa M. Diaz");
    }

    #[tokio::test]
    async fn test_theme_defaults_dark_and_toggles() {
        let store = CredentialStore::memory();
        assert_eq!(store.load_theme().await, Theme::Dark);
        assert_eq!(store.toggle_theme().await, Theme::Light);
        assert_eq!(store.toggle_theme().await, Theme::Dark);
    }

    #[tokio::test]
    async fn test_corrupt_profile_reads_as_absent() {
        let kv = MemoryKv::new();
        kv.set(TOKEN_KEY, "token".to_owned()).await.unwrap();
        kv.set(USER_KEY, "{not json".to_owned()).await.unwrap();
        kv.set(THEME_KEY, "sepia".to_owned()).await.unwrap();

        let store = CredentialStore::new(kv);
        let session = store.load().await;
        assert_eq!(session.token.as_deref(), Some("token"));
        assert!(session.profile.is_none());
        assert_eq!(store.load_theme().await, Theme::Dark);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let store = CredentialStore::file(&path);
        store.save("token", &profile("Rosa Diaz")).await;
        store.save_theme(Theme::Light).await;
        drop(store);

        let reopened = CredentialStore::file(&path);
        let session = reopened.load().await;
        assert!(session.is_complete());
        assert_eq!(reopened.load_theme().await, Theme::Light);

        reopened.clear().await;
        assert_eq!(CredentialStore::file(&path).load().await, Session::default());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_logged_out_and_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"garbage").await.unwrap();

        let store = CredentialStore::file(&path);
        assert_eq!(store.load().await, Session::default());

        store.save("token", &profile("Rosa Diaz")).await;
        assert_eq!(store.token().await.as_deref(), Some("token"));
    }
}
