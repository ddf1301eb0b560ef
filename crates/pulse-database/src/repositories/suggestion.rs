//! Return suggestion repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use pulse_core::error::{AppError, ErrorKind};
use pulse_core::result::AppResult;
use pulse_entity::discovery::{CreateReturnSuggestion, ReturnSuggestion};

use super::map_insert_error;

/// Repository for return suggestions.
#[derive(Debug, Clone)]
pub struct ReturnSuggestionRepository {
    pool: PgPool,
}

impl ReturnSuggestionRepository {
    /// Create a new return suggestion repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a suggestion; conflicts when one exists for the subject and patch.
    pub async fn create(&self, data: &CreateReturnSuggestion) -> AppResult<ReturnSuggestion> {
        sqlx::query_as::<_, ReturnSuggestion>(
            "INSERT INTO return_suggestions (subject_id, patch_id, reason, confidence) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.subject_id)
        .bind(data.patch_id)
        .bind(&data.reason)
        .bind(data.confidence)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "Failed to create return suggestion"))
    }

    /// List suggestions created for a patch.
    pub async fn find_by_patch(&self, patch_id: Uuid) -> AppResult<Vec<ReturnSuggestion>> {
        sqlx::query_as::<_, ReturnSuggestion>(
            "SELECT * FROM return_suggestions WHERE patch_id = $1 ORDER BY created_at ASC",
        )
        .bind(patch_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list return suggestions", e)
        })
    }
}
