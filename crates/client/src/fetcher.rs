//! Authenticated request dispatch.
//!
//! Every protected call reads the token from the [`CredentialStore`], attaches
//! it as a bearer header and maps the response to a typed result. A 401 on a
//! protected call ends the session: the store is cleared and one
//! [`SessionEvent::Expired`] is broadcast so whichever view is showing can
//! route back to login. Requests are never retried.

use reqwest::Method;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;

use shiftwatch_core::ValidationError;
use shiftwatch_core::wire::ErrorBody;

use crate::credential_store::CredentialStore;

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 16;

/// Characters of the token that may appear in logs.
const TOKEN_LOG_PREFIX: usize = 10;

/// Errors returned by the fetcher and the typed client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No saved token; nothing was sent.
    #[error("Not signed in")]
    Unauthenticated,

    /// The server rejected the token. The session has been cleared.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// Non-2xx response other than a session rejection.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// Connection, timeout or body transfer failure.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input rejected before sending.
    #[error("{}", .0.public_message())]
    Validation(#[from] ValidationError),

    /// The configured base URL can't carry a path.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// HTTP status for [`FetchError::Api`], 401 for an expired session.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A protected call got a 401; credentials were cleared.
    Expired,
}

/// Whether a call needs the saved token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
}

/// Request body.
#[derive(Debug, Default)]
pub enum Payload {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

/// Path segments plus query parameters, relative to the API base URL.
///
/// Segments are percent-encoded when joined, so device ids with spaces or
/// slashes stay one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Resolve against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base` can't be a base URL.
    pub fn resolve(&self, base: &Url) -> Result<Url, FetchError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(&self.segments);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// Token-attaching HTTP dispatcher.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialStore,
    events: broadcast::Sender<SessionEvent>,
}

impl Fetcher {
    /// Create a fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base_url` can't carry a path.
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        credentials: CredentialStore,
    ) -> Result<Self, FetchError> {
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            http,
            base_url,
            credentials,
            events,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Subscribe to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Send a request and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`FetchError`]. An authenticated call with no saved token fails
    /// with [`FetchError::Unauthenticated`] without touching the network.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &Endpoint,
        payload: Payload,
        access: Access,
    ) -> Result<T, FetchError> {
        let url = endpoint.resolve(&self.base_url)?;

        let token = match access {
            Access::Public => None,
            Access::Authenticated => Some(
                self.credentials
                    .token()
                    .await
                    .ok_or(FetchError::Unauthenticated)?,
            ),
        };

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = &token {
            tracing::debug!(
                %method,
                url = %url,
                token = %token_prefix(token),
                "Sending authenticated request"
            );
            request = request.bearer_auth(token);
        } else {
            tracing::debug!(%method, url = %url, "Sending request");
        }
        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();

        if let (reqwest::StatusCode::UNAUTHORIZED, Some(rejected)) = (status, token.as_deref()) {
            self.expire_session(rejected).await;
            return Err(FetchError::SessionExpired);
        }

        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| format!("Error del servidor ({})", status.as_u16()));
            tracing::debug!(status = status.as_u16(), %message, "Request failed");
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Concurrent requests rejected with the same token end the session once.
    async fn expire_session(&self, rejected: &str) {
        if !self.credentials.clear_if_token(rejected).await {
            tracing::debug!(token = %token_prefix(rejected), "Session already cleared");
            return;
        }
        tracing::warn!("Token rejected by the server; clearing session");
        // No subscribers is fine; the cleared store is the source of truth.
        let _ = self.events.send(SessionEvent::Expired);
    }
}

/// First characters of a token, for logs.
#[must_use]
pub fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_LOG_PREFIX).collect();
    format!("{prefix}...")
}
