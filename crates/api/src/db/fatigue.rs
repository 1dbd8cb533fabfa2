//! Fatigue snapshot repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use shiftwatch_core::{FatigueEvent, FatigueEventId, NewSnapshot, UserId};

use super::{FatigueStore, RepositoryError};

const EVENT_COLUMNS: &str =
    "id, user_id, recorded_at, camera_id, environment, photo_url, storage_key";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i32,
    user_id: i32,
    recorded_at: DateTime<Utc>,
    camera_id: String,
    environment: String,
    photo_url: String,
    storage_key: Option<String>,
}

impl From<EventRow> for FatigueEvent {
    fn from(r: EventRow) -> Self {
        Self {
            id: FatigueEventId::new(r.id),
            camera_id: r.camera_id,
            environment: r.environment,
            owner: UserId::new(r.user_id),
            recorded_at: r.recorded_at,
            photo_url: r.photo_url,
            storage_key: r.storage_key,
        }
    }
}

/// Repository for fatigue snapshots.
#[derive(Clone)]
pub struct PgFatigueRepository {
    pool: PgPool,
}

impl PgFatigueRepository {
    /// Create a new fatigue repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FatigueStore for PgFatigueRepository {
    #[instrument(skip(self, snapshot, photo_url, storage_key), fields(user_id = %owner, camera = %snapshot.camera_id))]
    async fn insert(
        &self,
        owner: UserId,
        snapshot: &NewSnapshot,
        photo_url: &str,
        storage_key: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> Result<FatigueEvent, RepositoryError> {
        let row: EventRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shiftwatch.fatigue_events
                (user_id, recorded_at, camera_id, environment, photo_url, storage_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EVENT_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(recorded_at)
        .bind(&snapshot.camera_id)
        .bind(&snapshot.environment)
        .bind(photo_url)
        .bind(storage_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self, owner: UserId) -> Result<Vec<FatigueEvent>, RepositoryError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            r"
            SELECT {EVENT_COLUMNS}
            FROM shiftwatch.fatigue_events
            WHERE user_id = $1
            ORDER BY recorded_at DESC, id DESC
            "
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(user_id = %owner, event_id = %id))]
    async fn delete(
        &self,
        owner: UserId,
        id: FatigueEventId,
    ) -> Result<Option<FatigueEvent>, RepositoryError> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            r"
            DELETE FROM shiftwatch.fatigue_events
            WHERE id = $1 AND user_id = $2
            RETURNING {EVENT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
