//! User account model.

use chrono::{DateTime, Utc};

use shiftwatch_core::{AvatarPreference, Email, UserId, UserProfile};

/// A registered account, including its password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    /// Nine national digits, no prefix.
    pub phone: String,
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub avatar: AvatarPreference,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public view of this account.
    #[must_use]
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            avatar: self.avatar,
        }
    }
}

/// Values for a new account row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub phone: String,
    pub email: Email,
    pub password_hash: String,
    pub avatar: AvatarPreference,
}

/// Values written by a profile edit. `None` leaves the column unchanged.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: String,
    pub email: Email,
    pub password_hash: Option<String>,
    pub avatar: Option<AvatarPreference>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_omits_password_hash() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(4),
            full_name: "Jorge Salas".to_owned(),
            phone: "912345678".to_owned(),
            email: Email::parse("jorge.salas@cistcor.com").unwrap(),
            password_hash: "$argon2id$v=19$...".to_owned(),
            avatar: AvatarPreference::Masculine,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user.to_profile()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"_id\":4"));
        assert!(json.contains("\"avatar\":\"masculine\""));
    }
}
