//! Boundary validation shared by the API handlers, the CLI and the client.
//!
//! Each `validate_*` function turns a loosely-typed wire body into a typed
//! value or the first rule it breaks. [`ValidationError::public_message`]
//! gives the user-facing text the API returns in its `{mensaje}` envelope.

use crate::types::{
    AvatarPreference, CORPORATE_DOMAIN, Email, EmailError, PASSWORD_SYMBOLS, PasswordPolicyError,
    PhoneError, PhoneNumber, validate_password,
};
use crate::wire::{CreateTemperatureRequest, LoginRequest, ProfileUpdateRequest, RegisterRequest};

/// Groups of fields that must be present together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredFields {
    /// Email and password on login.
    Credentials,
    /// Name, phone and email on registration/profile edit.
    Profile,
    /// Environment and device on a temperature reading.
    Reading,
    /// Camera, environment and photo on a fatigue snapshot.
    Snapshot,
}

/// A rule violated by an incoming body.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields: {0:?}")]
    MissingFields(RequiredFields),
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
    #[error("invalid password: {0}")]
    Password(#[from] PasswordPolicyError),
    #[error("invalid phone: {0}")]
    Phone(#[from] PhoneError),
}

impl ValidationError {
    /// Message returned to API clients.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingFields(RequiredFields::Credentials) => {
                "Correo y contraseña son requeridos".to_owned()
            }
            Self::MissingFields(RequiredFields::Profile) => {
                "Nombre, número de celular y correo son obligatorios".to_owned()
            }
            Self::MissingFields(RequiredFields::Reading) => {
                "Ambiente e ID de dispositivo son requeridos".to_owned()
            }
            Self::MissingFields(RequiredFields::Snapshot) => {
                "ID de cámara, ambiente y foto son requeridos".to_owned()
            }
            Self::Email(EmailError::ForeignDomain) => {
                format!("El correo debe terminar en @{CORPORATE_DOMAIN}")
            }
            Self::Email(_) => "Por favor, ingrese un correo válido".to_owned(),
            Self::Password(_) => format!(
                "La contraseña debe tener al menos 8 caracteres, una mayúscula, un número y un carácter especial ({PASSWORD_SYMBOLS})"
            ),
            Self::Phone(_) => "El número de celular debe tener 9 dígitos".to_owned(),
        }
    }
}

/// A registration that passed every rule.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub phone: PhoneNumber,
    pub email: Email,
    pub password: String,
    pub avatar: AvatarPreference,
}

/// A profile edit that passed every rule.
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub full_name: String,
    pub phone: PhoneNumber,
    pub email: Email,
    /// `None` keeps the current password.
    pub password: Option<String>,
    /// `None` keeps the current preference.
    pub avatar: Option<AvatarPreference>,
}

/// A temperature reading that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub environment: String,
    pub device_id: String,
    pub temperature: Option<f64>,
}

/// Fatigue snapshot text fields that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnapshot {
    pub camera_id: String,
    pub environment: String,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Validate a login body. Only presence is checked; a malformed email simply
/// fails the credential lookup.
///
/// # Errors
///
/// Returns [`ValidationError::MissingFields`] if either field is missing.
pub fn validate_login(req: &LoginRequest) -> Result<(String, String), ValidationError> {
    let email = present(req.email.as_ref());
    let password = req.password.as_deref().filter(|p| !p.is_empty());
    match (email, password) {
        (Some(email), Some(password)) => Ok((email.to_owned(), password.to_owned())),
        _ => Err(ValidationError::MissingFields(RequiredFields::Credentials)),
    }
}

/// Validate a registration body.
///
/// The password is checked first, then the email, then name and phone.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_registration(req: &RegisterRequest) -> Result<NewAccount, ValidationError> {
    let password = req.password.clone().unwrap_or_default();
    validate_password(&password)?;

    let email = Email::parse(req.email.as_deref().map(str::trim).unwrap_or_default())?;

    let full_name = present(req.full_name.as_ref())
        .ok_or(ValidationError::MissingFields(RequiredFields::Profile))?
        .to_owned();
    let phone = present(req.phone.as_ref())
        .ok_or(ValidationError::MissingFields(RequiredFields::Profile))?;
    let phone = PhoneNumber::parse(phone)?;

    Ok(NewAccount {
        full_name,
        phone,
        email,
        password,
        avatar: req.avatar.unwrap_or_default(),
    })
}

/// Validate a profile edit body.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_profile_update(
    req: &ProfileUpdateRequest,
) -> Result<ProfileChanges, ValidationError> {
    let (Some(full_name), Some(phone), Some(email)) = (
        present(req.full_name.as_ref()),
        present(req.phone.as_ref()),
        present(req.email.as_ref()),
    ) else {
        return Err(ValidationError::MissingFields(RequiredFields::Profile));
    };

    let email = Email::parse(email)?;
    let phone = PhoneNumber::parse(phone)?;

    let password = req.password.clone().filter(|p| !p.is_empty());
    if let Some(password) = &password {
        validate_password(password)?;
    }

    Ok(ProfileChanges {
        full_name: full_name.to_owned(),
        phone,
        email,
        password,
        avatar: req.avatar,
    })
}

/// Validate a temperature reading body.
///
/// # Errors
///
/// Returns [`ValidationError::MissingFields`] if environment or device is missing.
pub fn validate_new_reading(req: &CreateTemperatureRequest) -> Result<NewReading, ValidationError> {
    match (present(req.environment.as_ref()), present(req.device_id.as_ref())) {
        (Some(environment), Some(device_id)) => Ok(NewReading {
            environment: environment.to_owned(),
            device_id: device_id.to_owned(),
            temperature: req.temperature.filter(|t| t.is_finite()),
        }),
        _ => Err(ValidationError::MissingFields(RequiredFields::Reading)),
    }
}

/// Validate the text fields of a fatigue snapshot upload.
///
/// # Errors
///
/// Returns [`ValidationError::MissingFields`] if a field or the photo is missing.
pub fn validate_new_snapshot(
    camera_id: Option<&String>,
    environment: Option<&String>,
    has_photo: bool,
) -> Result<NewSnapshot, ValidationError> {
    match (present(camera_id), present(environment), has_photo) {
        (Some(camera_id), Some(environment), true) => Ok(NewSnapshot {
            camera_id: camera_id.to_owned(),
            environment: environment.to_owned(),
        }),
        _ => Err(ValidationError::MissingFields(RequiredFields::Snapshot)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            full_name: Some("Lucia Mendoza".to_owned()),
            phone: Some("987 654 321".to_owned()),
            email: Some("lucia@cistcor.com".to_owned()),
            password: Some("Planta_2024".to_owned()),
            avatar: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        let account = validate_registration(&registration()).unwrap();
        assert_eq!(account.phone.as_str(), "987654321");
        assert_eq!(account.avatar, AvatarPreference::Unspecified);
    }

    #[test]
    fn test_registration_checks_password_before_email() {
        let req = RegisterRequest {
            password: Some("short".to_owned()),
            email: Some("lucia@gmail.com".to_owned()),
            ..registration()
        };
        assert!(matches!(
            validate_registration(&req),
            Err(ValidationError::Password(_))
        ));
    }

    #[test]
    fn test_registration_rejects_foreign_domain() {
        let req = RegisterRequest {
            email: Some("lucia@gmail.com".to_owned()),
            ..registration()
        };
        let err = validate_registration(&req).unwrap_err();
        assert_eq!(err, ValidationError::Email(EmailError::ForeignDomain));
        assert_eq!(
            err.public_message(),
            "El correo debe terminar en @cistcor.com"
        );
    }

    #[test]
    fn test_registration_requires_name_and_phone() {
        let req = RegisterRequest {
            full_name: Some("   ".to_owned()),
            ..registration()
        };
        assert_eq!(
            validate_registration(&req).unwrap_err(),
            ValidationError::MissingFields(RequiredFields::Profile)
        );

        let req = RegisterRequest {
            phone: Some("12345".to_owned()),
            ..registration()
        };
        assert!(matches!(
            validate_registration(&req),
            Err(ValidationError::Phone(_))
        ));
    }

    #[test]
    fn test_profile_update_password_is_optional() {
        let req = ProfileUpdateRequest {
            full_name: Some("Lucia Mendoza".to_owned()),
            phone: Some("987654321".to_owned()),
            email: Some("lucia@cistcor.com".to_owned()),
            password: Some(String::new()),
            avatar: Some(AvatarPreference::Feminine),
        };
        let changes = validate_profile_update(&req).unwrap();
        assert!(changes.password.is_none());
        assert_eq!(changes.avatar, Some(AvatarPreference::Feminine));
    }

    #[test]
    fn test_profile_update_weak_password_rejected() {
        let req = ProfileUpdateRequest {
            full_name: Some("Lucia Mendoza".to_owned()),
            phone: Some("987654321".to_owned()),
            email: Some("lucia@cistcor.com".to_owned()),
            password: Some("weakpass".to_owned()),
            avatar: None,
        };
        assert!(matches!(
            validate_profile_update(&req),
            Err(ValidationError::Password(_))
        ));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req = LoginRequest {
            email: Some("a@cistcor.com".to_owned()),
            password: None,
        };
        assert_eq!(
            validate_login(&req).unwrap_err(),
            ValidationError::MissingFields(RequiredFields::Credentials)
        );
    }

    #[test]
    fn test_new_reading() {
        let req = CreateTemperatureRequest {
            environment: Some(" Sala A ".to_owned()),
            device_id: Some("ESP32-01".to_owned()),
            temperature: Some(f64::NAN),
        };
        let reading = validate_new_reading(&req).unwrap();
        assert_eq!(reading.environment, "Sala A");
        assert_eq!(reading.temperature, None);

        let missing = CreateTemperatureRequest {
            device_id: None,
            ..req
        };
        assert!(validate_new_reading(&missing).is_err());
    }

    #[test]
    fn test_new_snapshot_requires_photo() {
        let cam = "CAM-1".to_owned();
        let env = "Linea 3".to_owned();
        assert!(validate_new_snapshot(Some(&cam), Some(&env), true).is_ok());
        assert_eq!(
            validate_new_snapshot(Some(&cam), Some(&env), false).unwrap_err(),
            ValidationError::MissingFields(RequiredFields::Snapshot)
        );
    }
}
