//! Typed operations over the [`Fetcher`].

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tokio::sync::broadcast;

use shiftwatch_core::wire::{
    CreateTemperatureRequest, LoginRequest, LoginResponse, MessageBody, Paginated,
    ProfileUpdateRequest, RegisterRequest,
};
use shiftwatch_core::{
    Email, FatigueEvent, FatigueEventId, TemperatureReading, TemperatureReadingId, UserId,
    UserProfile, validate_login, validate_new_reading, validate_new_snapshot,
    validate_profile_update, validate_registration,
};

use crate::config::ClientConfig;
use crate::credential_store::{CredentialStore, Session};
use crate::fetcher::{Access, Endpoint, FetchError, Fetcher, Payload, SessionEvent};

/// A snapshot image to upload.
#[derive(Debug, Clone)]
pub struct SnapshotUpload {
    pub camera_id: String,
    pub environment: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// ShiftWatch API client.
#[derive(Debug, Clone)]
pub struct ShiftWatchClient {
    fetcher: Fetcher,
}

impl ShiftWatchClient {
    /// Build a client with a fresh HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be built or the base URL is
    /// unusable.
    pub fn new(config: &ClientConfig, credentials: CredentialStore) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            fetcher: Fetcher::new(http, config.api_url.clone(), credentials)?,
        })
    }

    #[must_use]
    pub const fn from_fetcher(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    #[must_use]
    pub const fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        self.fetcher.credentials()
    }

    /// Subscribe to session expiry notifications.
    #[must_use]
    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.fetcher.subscribe()
    }

    /// The saved session.
    pub async fn session(&self) -> Session {
        self.credentials().load().await
    }

    /// Sign in and save the session.
    ///
    /// A bare local part (`ana.rojas`) is completed with the corporate domain.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Validation`] for blank input, [`FetchError::Api`]
    /// (401) for bad credentials.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, FetchError> {
        let request = LoginRequest {
            email: Some(Email::normalize_input(email)),
            password: Some(password.to_owned()),
        };
        validate_login(&request)?;

        let response: LoginResponse = self
            .fetcher
            .send(
                Method::POST,
                &Endpoint::new(["login"]),
                json(&request)?,
                Access::Public,
            )
            .await?;

        self.credentials()
            .save(&response.token, &response.user)
            .await;
        tracing::info!(user_id = %response.user.id, "Signed in");
        Ok(response.user)
    }

    /// Register an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Validation`] when a rule fails locally, otherwise
    /// the server's rejection.
    #[tracing::instrument(skip(self, request))]
    pub async fn register(&self, mut request: RegisterRequest) -> Result<String, FetchError> {
        request.email = request.email.as_deref().map(Email::normalize_input);
        validate_registration(&request)?;

        let body: MessageBody = self
            .fetcher
            .send(
                Method::POST,
                &Endpoint::new(["registro"]),
                json(&request)?,
                Access::Public,
            )
            .await?;
        Ok(body.message)
    }

    /// Edit the signed-in user's profile and refresh the saved copy.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Validation`] when a rule fails locally, otherwise
    /// the server's rejection.
    #[tracing::instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        id: UserId,
        request: &ProfileUpdateRequest,
    ) -> Result<UserProfile, FetchError> {
        validate_profile_update(request)?;

        let profile: UserProfile = self
            .fetcher
            .send(
                Method::PUT,
                &Endpoint::new(["perfil".to_owned(), id.to_string()]),
                json(request)?,
                Access::Authenticated,
            )
            .await?;

        self.credentials().update_profile(&profile).await;
        Ok(profile)
    }

    /// Forget the saved session. Purely local.
    pub async fn logout(&self) {
        self.credentials().clear().await;
        tracing::info!("Signed out");
    }

    /// One page of the caller's readings, newest first.
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    pub async fn list_temperature(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<TemperatureReading>, FetchError> {
        self.get(Endpoint::new(["temperatura"]).query("page", page).query("limit", limit))
            .await
    }

    /// One page of a single device's readings, newest first.
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    pub async fn list_device_temperature(
        &self,
        device_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<TemperatureReading>, FetchError> {
        self.get(
            Endpoint::new(["temperatura", "device", device_id])
                .query("page", page)
                .query("limit", limit),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`FetchError::Api`] (404) if the reading is not the caller's.
    pub async fn get_temperature(
        &self,
        id: TemperatureReadingId,
    ) -> Result<TemperatureReading, FetchError> {
        self.get(Endpoint::new(["temperatura".to_owned(), id.to_string()]))
            .await
    }

    /// Latest reading reported by a device.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Api`] (404) if the device has no readings.
    pub async fn latest_for_device(&self, device_id: &str) -> Result<TemperatureReading, FetchError> {
        self.get(Endpoint::new(["temperatura", "idDispositivo", device_id]))
            .await
    }

    /// Record a reading.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Validation`] when environment or device is blank.
    pub async fn create_temperature(
        &self,
        request: &CreateTemperatureRequest,
    ) -> Result<TemperatureReading, FetchError> {
        validate_new_reading(request)?;
        self.fetcher
            .send(
                Method::POST,
                &Endpoint::new(["temperatura"]),
                json(request)?,
                Access::Authenticated,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns [`FetchError::Api`] (404) if the reading is not the caller's.
    pub async fn delete_temperature(&self, id: TemperatureReadingId) -> Result<String, FetchError> {
        self.delete(Endpoint::new(["temperatura".to_owned(), id.to_string()]))
            .await
    }

    /// The caller's fatigue snapshots, newest first.
    ///
    /// # Errors
    ///
    /// See [`FetchError`].
    pub async fn list_fatigue(&self) -> Result<Vec<FatigueEvent>, FetchError> {
        self.get(Endpoint::new(["fatiga"])).await
    }

    /// Upload a snapshot as `multipart/form-data`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Validation`] when a field is blank or the image
    /// is empty, [`FetchError::Api`] (400) when the server rejects the image.
    #[tracing::instrument(skip(self, upload), fields(camera = %upload.camera_id, bytes = upload.bytes.len()))]
    pub async fn upload_fatigue(&self, upload: SnapshotUpload) -> Result<FatigueEvent, FetchError> {
        validate_new_snapshot(
            Some(&upload.camera_id),
            Some(&upload.environment),
            !upload.bytes.is_empty(),
        )?;

        let photo = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new()
            .text("idCamara", upload.camera_id)
            .text("ambiente", upload.environment)
            .part("foto", photo);

        self.fetcher
            .send(
                Method::POST,
                &Endpoint::new(["fatiga"]),
                Payload::Multipart(form),
                Access::Authenticated,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns [`FetchError::Api`] (404) if the snapshot is not the caller's.
    pub async fn delete_fatigue(&self, id: FatigueEventId) -> Result<String, FetchError> {
        self.delete(Endpoint::new(["fatiga".to_owned(), id.to_string()]))
            .await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, FetchError> {
        self.fetcher
            .send(Method::GET, &endpoint, Payload::Empty, Access::Authenticated)
            .await
    }

    async fn delete(&self, endpoint: Endpoint) -> Result<String, FetchError> {
        let body: MessageBody = self
            .fetcher
            .send(Method::DELETE, &endpoint, Payload::Empty, Access::Authenticated)
            .await?;
        Ok(body.message)
    }
}

fn json(body: &impl Serialize) -> Result<Payload, FetchError> {
    Ok(Payload::Json(serde_json::to_value(body)?))
}
