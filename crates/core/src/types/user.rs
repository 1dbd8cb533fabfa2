//! User profile as exposed to clients (never carries the password hash).

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// Which stock avatar the user wants.
///
/// `Unspecified` lets the client fall back to its name-based guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarPreference {
    #[default]
    Unspecified,
    Feminine,
    Masculine,
}

impl AvatarPreference {
    /// Database/wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Feminine => "feminine",
            Self::Masculine => "masculine",
        }
    }

    /// Parse the database spelling, treating anything unknown as unspecified.
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "feminine" => Self::Feminine,
            "masculine" => Self::Masculine,
            _ => Self::Unspecified,
        }
    }
}

/// Public view of an account, as returned by `/login` and `/perfil/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(rename = "nombreApellido")]
    pub full_name: String,
    #[serde(rename = "numeroCelular")]
    pub phone: String,
    #[serde(rename = "correoElectronico")]
    pub email: Email,
    #[serde(default)]
    pub avatar: AvatarPreference,
}
