//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use shiftwatch_core::{AvatarPreference, Email, UserId};

use super::{RepositoryError, UserStore, map_unique_violation};
use crate::models::{NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str =
    "id, full_name, phone, email, password_hash, avatar, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    full_name: String,
    phone: String,
    email: String,
    password_hash: String,
    avatar: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(r.id),
            full_name: r.full_name,
            phone: r.phone,
            email,
            password_hash: r.password_hash,
            avatar: AvatarPreference::from_db(&r.avatar),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shiftwatch.users (full_name, phone, email, password_hash, avatar)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.avatar.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        row.try_into()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM shiftwatch.users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[instrument(skip(self, update), fields(user_id = %id))]
    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r"
            UPDATE shiftwatch.users
            SET full_name = $2,
                phone = $3,
                email = $4,
                password_hash = COALESCE($5, password_hash),
                avatar = COALESCE($6, avatar),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.phone)
        .bind(update.email.as_str())
        .bind(update.password_hash.as_deref())
        .bind(update.avatar.map(AvatarPreference::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        row.map(User::try_from).transpose()
    }
}
