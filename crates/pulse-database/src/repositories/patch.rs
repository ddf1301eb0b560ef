//! Patch repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use pulse_core::error::{AppError, ErrorKind};
use pulse_core::result::AppResult;
use pulse_entity::content::{Patch, PatchSummaryUpdate};

/// Repository for patch records.
#[derive(Debug, Clone)]
pub struct PatchRepository {
    pool: PgPool,
}

impl PatchRepository {
    /// Create a new patch repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a patch by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Patch>> {
        sqlx::query_as::<_, Patch>("SELECT * FROM patches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find patch", e))
    }

    /// Write summary fields back to a patch.
    ///
    /// Summary fields always overwrite; tags and source URL are only written
    /// when the update carries them.
    pub async fn apply_summary(&self, id: Uuid, update: &PatchSummaryUpdate) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE patches SET summary_tldr = $2, ai_insight = $3, key_changes = $4, \
             impact_score = $5, tags = COALESCE($6, tags), \
             source_url = COALESCE($7, source_url), ai_processed_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.summary_tldr)
        .bind(&update.ai_insight)
        .bind(&update.key_changes)
        .bind(update.impact_score)
        .bind(&update.tags)
        .bind(&update.source_url)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update patch", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Patch {id} not found")));
        }
        Ok(())
    }
}
