//! Subject repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use pulse_core::error::{AppError, ErrorKind};
use pulse_core::result::AppResult;
use pulse_entity::subject::Subject;

/// Repository for tracked subjects.
#[derive(Debug, Clone)]
pub struct SubjectRepository {
    pool: PgPool,
}

impl SubjectRepository {
    /// Create a new subject repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a subject by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subject>> {
        sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find subject", e))
    }

    /// List every paused subject.
    pub async fn find_paused(&self) -> AppResult<Vec<Subject>> {
        sqlx::query_as::<_, Subject>(
            "SELECT * FROM subjects WHERE status = 'paused' ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list paused subjects", e)
        })
    }
}
