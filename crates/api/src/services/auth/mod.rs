//! Authentication service.
//!
//! Password registration and login (argon2), bearer token issuing, and
//! profile edits for the calling user.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{TokenError, TokenKeys};

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{info, instrument};

use shiftwatch_core::{NewAccount, ProfileChanges, UserId};

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, ProfileUpdate, User};

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a Arc<dyn UserStore>,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a Arc<dyn UserStore>, tokens: &'a TokenKeys) -> Self {
        Self { users, tokens }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn register(&self, account: &NewAccount) -> Result<User, AuthError> {
        let password_hash = hash_password(&account.password)?;

        let user = self
            .users
            .create(&NewUser {
                full_name: account.full_name.clone(),
                phone: account.phone.as_str().to_owned(),
                email: account.email.clone(),
                password_hash,
                avatar: account.avatar,
            })
            .await
            .map_err(conflict_as_taken)?;

        info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Check credentials and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AuthError> {
        let user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let token = self.tokens.issue(user.id)?;
        Ok((token, user))
    }

    /// Apply a profile edit on behalf of `caller`.
    ///
    /// Only the caller's own profile can be edited; any other target is
    /// reported as not found.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for a foreign or missing account and
    /// `AuthError::EmailTaken` if the new email belongs to someone else.
    #[instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        caller: UserId,
        target: UserId,
        changes: &ProfileChanges,
    ) -> Result<User, AuthError> {
        if caller != target {
            return Err(AuthError::UserNotFound);
        }

        let password_hash = changes
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;

        self.users
            .update_profile(
                target,
                &ProfileUpdate {
                    full_name: changes.full_name.clone(),
                    phone: changes.phone.as_str().to_owned(),
                    email: changes.email.clone(),
                    password_hash,
                    avatar: changes.avatar,
                },
            )
            .await
            .map_err(conflict_as_taken)?
            .ok_or(AuthError::UserNotFound)
    }
}

fn conflict_as_taken(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(_) => AuthError::EmailTaken,
        other => AuthError::Repository(other),
    }
}

/// Hash a password using Argon2.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use shiftwatch_core::{AvatarPreference, Email, PhoneNumber};

    use super::*;
    use crate::db::MemoryStore;

    fn account(email: &str) -> NewAccount {
        NewAccount {
            full_name: "Carmen Rojas".to_owned(),
            phone: PhoneNumber::parse("987654321").unwrap(),
            email: Email::parse(email).unwrap(),
            password: "Turno_2024".to_owned(),
            avatar: AvatarPreference::Unspecified,
        }
    }

    fn fixtures() -> (Arc<dyn UserStore>, TokenKeys) {
        (
            Arc::new(MemoryStore::new()),
            TokenKeys::from_secret(b"unit-test-key-4f9a8b7c6d5e4f3a2b1c", Duration::hours(24)),
        )
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("Turno_2024").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Turno_2024", &hash).is_ok());
        assert!(matches!(
            verify_password("turno_2024", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (users, keys) = fixtures();
        let auth = AuthService::new(&users, &keys);
        let user = auth.register(&account("carmen@cistcor.com")).await.unwrap();

        let (token, logged_in) = auth.login("carmen@cistcor.com", "Turno_2024").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(keys.verify(&token).unwrap(), user.id);

        assert!(matches!(
            auth.login("carmen@cistcor.com", "Wrong_2024").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@cistcor.com", "Turno_2024").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (users, keys) = fixtures();
        let auth = AuthService::new(&users, &keys);
        auth.register(&account("carmen@cistcor.com")).await.unwrap();
        assert!(matches!(
            auth.register(&account("carmen@cistcor.com")).await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_update_profile_only_for_caller() {
        let (users, keys) = fixtures();
        let auth = AuthService::new(&users, &keys);
        let carmen = auth.register(&account("carmen@cistcor.com")).await.unwrap();
        let other = auth.register(&account("otro@cistcor.com")).await.unwrap();

        let changes = ProfileChanges {
            full_name: "Carmen R.".to_owned(),
            phone: PhoneNumber::parse("912345678").unwrap(),
            email: Email::parse("carmen@cistcor.com").unwrap(),
            password: Some("Nuevo_2025".to_owned()),
            avatar: Some(AvatarPreference::Feminine),
        };

        assert!(matches!(
            auth.update_profile(other.id, carmen.id, &changes).await,
            Err(AuthError::UserNotFound)
        ));

        let updated = auth.update_profile(carmen.id, carmen.id, &changes).await.unwrap();
        assert_eq!(updated.full_name, "Carmen R.");
        assert_eq!(updated.avatar, AvatarPreference::Feminine);
        assert!(auth.login("carmen@cistcor.com", "Nuevo_2025").await.is_ok());
    }
}
