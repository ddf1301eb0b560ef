//! Seasonal event repository implementation.

use sqlx::PgPool;

use pulse_core::result::AppResult;
use pulse_entity::discovery::{CreateSeasonalEvent, SeasonalEvent};

use super::map_insert_error;

/// Repository for discovered seasonal events.
#[derive(Debug, Clone)]
pub struct SeasonalEventRepository {
    pool: PgPool,
}

impl SeasonalEventRepository {
    /// Create a new seasonal event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a seasonal event.
    ///
    /// Fails with a conflict when the subject already has an event with the
    /// same name and start date.
    pub async fn create(&self, data: &CreateSeasonalEvent) -> AppResult<SeasonalEvent> {
        sqlx::query_as::<_, SeasonalEvent>(
            "INSERT INTO seasonal_events \
             (subject_id, name, event_type, starts_on, ends_on, confidence, source_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.subject_id)
        .bind(&data.name)
        .bind(&data.event_type)
        .bind(data.starts_on)
        .bind(data.ends_on)
        .bind(data.confidence)
        .bind(&data.source_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "Failed to create seasonal event"))
    }
}
