//! End-to-end test harness for ShiftWatch.
//!
//! [`TestServer`] runs the real API router on an ephemeral local port over
//! the in-memory store, with snapshot images in a temp directory. Tests then
//! drive it through [`shiftwatch_client::ShiftWatchClient`] exactly as the
//! CLI does, so no database or external process is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shiftwatch-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use shiftwatch_api::services::auth::TokenKeys;
use shiftwatch_api::state::{AppState, StateParts, Stores};
use shiftwatch_api::storage::LocalDiskStore;
use shiftwatch_client::{ClientConfig, CredentialStore, ShiftWatchClient};
use shiftwatch_core::UserId;
use shiftwatch_core::wire::RegisterRequest;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

/// Signing secret shared by the server and [`TestServer::expired_token`].
const SECRET: &[u8] = b"integration-Lk4mN8pQ2rS6tV0wX3yZ";

/// Password that satisfies the policy.
pub const PASSWORD: &str = "Turno_2024";

/// Snapshot size limit used by the test server.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// A running API instance.
pub struct TestServer {
    addr: SocketAddr,
    upload_dir: TempDir,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the port can't be bound or the temp dir can't be created.
    pub async fn spawn() -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let state = AppState::from_parts(StateParts {
            stores: Stores::memory(),
            images: Arc::new(LocalDiskStore::new(upload_dir.path())),
            tokens: TokenKeys::from_secret(SECRET, chrono::Duration::hours(24)),
            public_url: format!("http://{addr}"),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        });
        let app = shiftwatch_api::app(state, upload_dir.path(), &[]);

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            upload_dir,
            task,
        }
    }

    /// Base URL of the running server.
    ///
    /// # Panics
    ///
    /// Never in practice; the address always forms a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Invalid server URL")
    }

    /// Directory holding uploaded images.
    #[must_use]
    pub fn upload_dir(&self) -> &std::path::Path {
        self.upload_dir.path()
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.url(),
            poll_interval: Duration::from_millis(50),
            http_timeout: Duration::from_secs(5),
            ..ClientConfig::default()
        }
    }

    /// A client with a fresh in-memory session.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client can't be built.
    #[must_use]
    pub fn client(&self) -> ShiftWatchClient {
        self.client_with(CredentialStore::memory())
    }

    /// A client over the given credential store.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client can't be built.
    #[must_use]
    pub fn client_with(&self, credentials: CredentialStore) -> ShiftWatchClient {
        ShiftWatchClient::new(&self.client_config(), credentials).expect("Failed to build client")
    }

    /// Register an account and sign the client in. Returns the user's id.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub async fn sign_up(&self, client: &ShiftWatchClient, local_part: &str, name: &str) -> UserId {
        client
            .register(RegisterRequest {
                full_name: Some(name.to_owned()),
                phone: Some("987654321".to_owned()),
                email: Some(local_part.to_owned()),
                password: Some(PASSWORD.to_owned()),
                avatar: None,
            })
            .await
            .expect("Registration failed");

        client
            .login(local_part, PASSWORD)
            .await
            .expect("Login failed")
            .id
    }

    /// A correctly signed token for `user` that expired a minute ago.
    ///
    /// # Panics
    ///
    /// Panics if signing fails.
    #[must_use]
    pub fn expired_token(&self, user: UserId) -> String {
        TokenKeys::from_secret(SECRET, chrono::Duration::minutes(-1))
            .issue(user)
            .expect("Failed to sign token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Smallest valid PNG: 1x1 transparent pixel.
pub const PNG_PIXEL: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];
