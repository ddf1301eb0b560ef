//! AI job repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pulse_core::error::{AppError, ErrorKind};
use pulse_core::result::AppResult;
use pulse_entity::job::{Job, JobStats, JobStatus, JobType};

/// Repository for AI job persistence and queue operations.
///
/// Uniqueness of `(job_type, entity_id)` is enforced by the
/// `uq_ai_jobs_type_entity` constraint, and every status transition made by
/// the dispatcher is a single conditional `UPDATE`.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a job by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>("SELECT * FROM ai_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    /// Find the job for a `(job_type, entity_id)` pair.
    pub async fn find_by_key(&self, job_type: JobType, entity_id: Uuid) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>("SELECT * FROM ai_jobs WHERE job_type = $1 AND entity_id = $2")
            .bind(job_type)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    /// Insert a pending job unless one already exists for the pair.
    ///
    /// Returns `None` when a job with the same key exists in any status.
    pub async fn insert_if_absent(
        &self,
        job_type: JobType,
        entity_id: Uuid,
    ) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO ai_jobs (job_type, entity_id, status, attempts) \
             VALUES ($1, $2, 'pending', 0) \
             ON CONFLICT (job_type, entity_id) DO NOTHING \
             RETURNING *",
        )
        .bind(job_type)
        .bind(entity_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enqueue job", e))
    }

    /// Fetch up to `limit` pending jobs, oldest first.
    pub async fn fetch_pending(&self, limit: i64) -> AppResult<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM ai_jobs WHERE status = 'pending' \
             ORDER BY created_at ASC, id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch pending jobs", e))
    }

    /// Claim a pending job.
    ///
    /// Returns the claimed row, or `None` when the job is no longer pending.
    pub async fn claim(&self, job_id: Uuid) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "UPDATE ai_jobs SET status = 'running', started_at = NOW(), attempts = attempts + 1 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING *",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim job", e))
    }

    /// Mark a job as done.
    pub async fn finalize_success(&self, job_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE ai_jobs SET status = 'done', error_message = NULL, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete job", e))?;
        Ok(())
    }

    /// Record a failed attempt with the status chosen by the retry policy.
    pub async fn finalize_failure(
        &self,
        job_id: Uuid,
        status: JobStatus,
        error_message: &str,
    ) -> AppResult<()> {
        sqlx::query("UPDATE ai_jobs SET status = $2, error_message = $3 WHERE id = $1")
            .bind(job_id)
            .bind(status)
            .bind(error_message)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record job failure", e)
            })?;
        Ok(())
    }

    /// Reset a job that is not running back to a fresh pending state.
    pub async fn reset_to_pending(&self, job_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE ai_jobs SET status = 'pending', attempts = 0, error_message = NULL, \
             started_at = NULL, completed_at = NULL \
             WHERE id = $1 AND status <> 'running'",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset job", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Reset every failed job back to a fresh pending state.
    pub async fn reset_failed(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE ai_jobs SET status = 'pending', attempts = 0, error_message = NULL, \
             started_at = NULL, completed_at = NULL \
             WHERE status = 'failed'",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset failed jobs", e))?;
        Ok(result.rows_affected())
    }

    /// Return running jobs claimed before `started_before` to pending.
    ///
    /// Attempts are kept, so a reclaimed job still counts its lost attempt.
    pub async fn reclaim_stale(&self, started_before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE ai_jobs SET status = 'pending' \
             WHERE status = 'running' AND started_at < $1",
        )
        .bind(started_before)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reclaim jobs", e))?;
        Ok(result.rows_affected())
    }

    /// Count jobs per status.
    pub async fn count_by_status(&self) -> AppResult<JobStats> {
        let rows: Vec<(JobStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM ai_jobs GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count jobs", e))?;

        let mut stats = JobStats::default();
        for (status, count) in rows {
            stats.add(status, count);
        }
        Ok(stats)
    }

    /// List the most recently attempted failed jobs.
    pub async fn recent_failed(&self, limit: i64) -> AppResult<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM ai_jobs WHERE status = 'failed' \
             ORDER BY COALESCE(started_at, created_at) DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list failed jobs", e))
    }
}
