//! Discovery queue repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use pulse_core::error::{AppError, ErrorKind};
use pulse_core::result::AppResult;
use pulse_entity::discovery::DiscoveryStatus;

/// Repository for per-subject discovery bookkeeping.
#[derive(Debug, Clone)]
pub struct DiscoveryQueueRepository {
    pool: PgPool,
}

impl DiscoveryQueueRepository {
    /// Create a new discovery queue repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store the outcome of a discovery run, creating the entry if needed.
    pub async fn record_outcome(
        &self,
        subject_id: Uuid,
        status: DiscoveryStatus,
        raw_payload: &serde_json::Value,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO discovery_queue (subject_id, status, raw_payload, last_checked_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (subject_id) DO UPDATE SET status = EXCLUDED.status, \
             raw_payload = EXCLUDED.raw_payload, last_checked_at = EXCLUDED.last_checked_at",
        )
        .bind(subject_id)
        .bind(status)
        .bind(raw_payload)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record discovery outcome", e)
        })?;
        Ok(())
    }
}
