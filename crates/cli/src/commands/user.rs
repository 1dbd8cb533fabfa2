//! Account provisioning commands.
//!
//! # Usage
//!
//! ```bash
//! shiftwatch-cli user create -e ana.rojas@cistcor.com -n "Ana Rojas" -p 987654321 --password 'Planta_2024'
//! ```
//!
//! The same rules as `POST /registro` apply: corporate email domain, the
//! password policy and a nine-digit phone number.
//!
//! # Environment Variables
//!
//! - `SHIFTWATCH_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use shiftwatch_api::db::{PgUserRepository, RepositoryError, UserStore};
use shiftwatch_api::models::NewUser;
use shiftwatch_api::services::auth::{AuthError, hash_password};
use shiftwatch_core::wire::RegisterRequest;
use shiftwatch_core::{Email, UserId, ValidationError, validate_registration};
use thiserror::Error;

use super::migrate::database_url;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input broke a registration rule.
    #[error("{}", .0.public_message())]
    Invalid(#[from] ValidationError),

    /// An account already uses this email.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),
}

/// Build the registration body from CLI arguments.
fn registration(email: &str, name: &str, phone: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        full_name: Some(name.to_owned()),
        phone: Some(phone.to_owned()),
        email: Some(Email::normalize_input(email)),
        password: Some(password.to_owned()),
        avatar: None,
    }
}

/// Create a new account.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(
    email: &str,
    name: &str,
    phone: &str,
    password: &str,
) -> Result<UserId, UserError> {
    let account = validate_registration(&registration(email, name, phone, password))?;

    let database_url = database_url().ok_or(UserError::MissingEnvVar("SHIFTWATCH_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = shiftwatch_api::db::create_pool(&database_url).await?;
    let users = PgUserRepository::new(pool);

    tracing::info!("Creating user: {}", account.email);

    let user = users
        .create(&NewUser {
            full_name: account.full_name.clone(),
            phone: account.phone.as_str().to_owned(),
            email: account.email.clone(),
            password_hash: hash_password(&account.password)?,
            avatar: account.avatar,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(account.email.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_normalizes_bare_email() {
        let req = registration("ana.rojas", "Ana Rojas", "987654321", "Planta_2024");
        let account = validate_registration(&req).unwrap();
        assert_eq!(account.email.as_str(), "ana.rojas@cistcor.com");
    }

    #[test]
    fn test_weak_password_is_rejected_before_connecting() {
        let req = registration("ana.rojas@cistcor.com", "Ana Rojas", "987654321", "short");
        let err = UserError::from(validate_registration(&req).unwrap_err());
        assert!(err.to_string().starts_with("La contraseña debe tener"));
    }
}
