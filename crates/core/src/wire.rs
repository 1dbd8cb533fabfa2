//! JSON bodies exchanged between the API and its clients.
//!
//! Request bodies use `Option<String>` for every field so a missing field is
//! reported as a 400 with a readable message instead of a deserializer error.

use serde::{Deserialize, Serialize};

use crate::types::{AvatarPreference, UserProfile};

/// `POST /login` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "correoElectronico", default)]
    pub email: Option<String>,
    #[serde(rename = "contrasena", default)]
    pub password: Option<String>,
}

/// `POST /login` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: UserProfile,
}

/// `POST /registro` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nombreApellido", default)]
    pub full_name: Option<String>,
    #[serde(rename = "numeroCelular", default)]
    pub phone: Option<String>,
    #[serde(rename = "correoElectronico", default)]
    pub email: Option<String>,
    #[serde(rename = "contrasena", default)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<AvatarPreference>,
}

/// `PUT /perfil/{id}` body. The password is optional; when absent it is
/// left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(rename = "nombreApellido", default)]
    pub full_name: Option<String>,
    #[serde(rename = "numeroCelular", default)]
    pub phone: Option<String>,
    #[serde(rename = "correoElectronico", default)]
    pub email: Option<String>,
    #[serde(rename = "contrasena", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<AvatarPreference>,
}

/// `POST /temperatura` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTemperatureRequest {
    #[serde(rename = "ambiente", default)]
    pub environment: Option<String>,
    #[serde(rename = "idDispositivo", default)]
    pub device_id: Option<String>,
    #[serde(rename = "temperatura", default)]
    pub temperature: Option<f64>,
}

/// A page of results plus the page count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(rename = "datos")]
    pub items: Vec<T>,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

/// Raw `page`/`limit` query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// `{mensaje}` envelope used for confirmations and most errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(rename = "mensaje")]
    pub message: String,
}

impl MessageBody {
    /// Wrap a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body as seen by a client: either `mensaje` or `error` may be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub mensaje: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The server-provided message, preferring `mensaje` over `error`.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.mensaje
            .filter(|m| !m.is_empty())
            .or_else(|| self.error.filter(|e| !e.is_empty()))
    }
}
