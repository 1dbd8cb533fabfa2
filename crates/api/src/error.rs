//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Client-facing bodies follow the mobile contract: `{"mensaje": ...}` for
//! expected failures and `{"error": ...}` for server faults.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use shiftwatch_core::ValidationError;
use shiftwatch_core::wire::MessageBody;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Body text for a request body that isn't the expected JSON.
pub const MALFORMED_BODY_MESSAGE: &str = "Cuerpo de la solicitud inválido";

/// Body text of every 5xx response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Request body broke a validation rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body was not valid JSON for the expected shape.
    #[error("Malformed body: {0}")]
    MalformedBody(#[from] JsonRejection),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::EmailTaken => StatusCode::BAD_REQUEST,
                AuthError::TokenSigning(_)
                | AuthError::Repository(_)
                | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::BadRequest(_) | Self::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message shown to the client for non-5xx errors.
    fn public_message(&self) -> String {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => "Credenciales inválidas".to_owned(),
            Self::Auth(AuthError::UserNotFound) => "Usuario no encontrado".to_owned(),
            Self::Auth(AuthError::EmailTaken) => "El correo ya está en uso".to_owned(),
            Self::Validation(err) => err.public_message(),
            Self::MalformedBody(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                MALFORMED_BODY_MESSAGE.to_owned()
            }
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            // Don't expose internal error details to clients
            _ => INTERNAL_ERROR_MESSAGE.to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            return (status, Json(json!({ "error": INTERNAL_ERROR_MESSAGE }))).into_response();
        }

        (status, Json(MessageBody::new(self.public_message()))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
