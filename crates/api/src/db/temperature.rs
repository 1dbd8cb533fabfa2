//! Temperature reading repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use shiftwatch_core::{NewReading, PageRequest, TemperatureReading, TemperatureReadingId, UserId};

use super::{RepositoryError, TemperatureStore};

const READING_COLUMNS: &str =
    "id, user_id, recorded_at, temperature, environment, device_id, fan_engaged";

#[derive(sqlx::FromRow)]
struct ReadingRow {
    id: i32,
    user_id: i32,
    recorded_at: DateTime<Utc>,
    temperature: Option<f64>,
    environment: String,
    device_id: String,
    fan_engaged: bool,
}

impl From<ReadingRow> for TemperatureReading {
    fn from(r: ReadingRow) -> Self {
        Self {
            id: TemperatureReadingId::new(r.id),
            recorded_at: r.recorded_at,
            temperature: r.temperature,
            environment: r.environment,
            owner: UserId::new(r.user_id),
            device_id: r.device_id,
            fan_engaged: r.fan_engaged,
        }
    }
}

/// Repository for temperature readings.
#[derive(Clone)]
pub struct PgTemperatureRepository {
    pool: PgPool,
}

impl PgTemperatureRepository {
    /// Create a new temperature repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_i64(value: u64) -> Result<i64, RepositoryError> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("value out of range: {value}")))
}

#[async_trait]
impl TemperatureStore for PgTemperatureRepository {
    #[instrument(skip(self, reading), fields(user_id = %owner, device = %reading.device_id))]
    async fn insert(
        &self,
        owner: UserId,
        reading: &NewReading,
        fan_engaged: bool,
        recorded_at: DateTime<Utc>,
    ) -> Result<TemperatureReading, RepositoryError> {
        let row: ReadingRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shiftwatch.temperature_readings
                (user_id, recorded_at, temperature, environment, device_id, fan_engaged)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {READING_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(recorded_at)
        .bind(reading.temperature)
        .bind(&reading.environment)
        .bind(&reading.device_id)
        .bind(fan_engaged)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = row.id, "Inserted temperature reading");
        Ok(row.into())
    }

    async fn list(
        &self,
        owner: UserId,
        device_id: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<TemperatureReading>, u64), RepositoryError> {
        let rows: Vec<ReadingRow> = sqlx::query_as(&format!(
            r"
            SELECT {READING_COLUMNS}
            FROM shiftwatch.temperature_readings
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR device_id = $2)
            ORDER BY recorded_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(owner)
        .bind(device_id)
        .bind(i64::from(page.limit()))
        .bind(to_i64(page.offset())?)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM shiftwatch.temperature_readings
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR device_id = $2)
            ",
        )
        .bind(owner)
        .bind(device_id)
        .fetch_one(&self.pool)
        .await?;

        let total = u64::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative count: {total}")))?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn get(
        &self,
        owner: UserId,
        id: TemperatureReadingId,
    ) -> Result<Option<TemperatureReading>, RepositoryError> {
        let row: Option<ReadingRow> = sqlx::query_as(&format!(
            r"
            SELECT {READING_COLUMNS}
            FROM shiftwatch.temperature_readings
            WHERE id = $1 AND user_id = $2
            "
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn latest_for_device(
        &self,
        owner: UserId,
        device_id: &str,
    ) -> Result<Option<TemperatureReading>, RepositoryError> {
        let row: Option<ReadingRow> = sqlx::query_as(&format!(
            r"
            SELECT {READING_COLUMNS}
            FROM shiftwatch.temperature_readings
            WHERE user_id = $1 AND device_id = $2
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1
            "
        ))
        .bind(owner)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(user_id = %owner, reading_id = %id))]
    async fn delete(
        &self,
        owner: UserId,
        id: TemperatureReadingId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM shiftwatch.temperature_readings WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
