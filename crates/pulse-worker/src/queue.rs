//! Idempotent enqueueing and operator-facing queue operations.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use pulse_core::result::AppResult;
use pulse_entity::job::{Job, JobStats, JobType};

use crate::store::JobStore;

/// Job queue over a [`JobStore`].
#[derive(Clone)]
pub struct JobQueue {
    store: Arc<dyn JobStore>,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue").finish()
    }
}

impl JobQueue {
    /// Create a queue backed by `store`.
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Enqueue a job for `(job_type, entity_id)`.
    ///
    /// Returns `None` when a job already exists for the pair, whatever its
    /// status. The existing job is left untouched.
    pub async fn enqueue(&self, job_type: JobType, entity_id: Uuid) -> AppResult<Option<Job>> {
        let job = self.store.insert_if_absent(job_type, entity_id).await?;

        match &job {
            Some(job) => tracing::debug!(
                job.id = %job.id,
                job_type = %job_type,
                %entity_id,
                "Enqueued job"
            ),
            None => tracing::debug!(
                job_type = %job_type,
                %entity_id,
                "Job already exists, enqueue is a no-op"
            ),
        }

        Ok(job)
    }

    /// Job counts per status.
    pub async fn stats(&self) -> AppResult<JobStats> {
        self.store.count_by_status().await
    }

    /// Most recently attempted failed jobs with their error messages.
    pub async fn recent_failed(&self, limit: i64) -> AppResult<Vec<Job>> {
        self.store.recent_failed(limit).await
    }

    /// Reset one job to pending with zero attempts. Running jobs are left alone.
    pub async fn reset(&self, job_id: Uuid) -> AppResult<bool> {
        let reset = self.store.reset_to_pending(job_id).await?;
        if reset {
            tracing::info!(job.id = %job_id, "Job reset to pending");
        } else {
            tracing::warn!(job.id = %job_id, "Job not reset: missing or running");
        }
        Ok(reset)
    }

    /// Reset every failed job to pending.
    pub async fn reset_failed(&self) -> AppResult<u64> {
        let count = self.store.reset_failed().await?;
        tracing::info!(count, "Failed jobs reset to pending");
        Ok(count)
    }

    /// Return jobs stuck in `running` for longer than `older_than` to pending.
    ///
    /// Never called by the dispatcher; a crash between claim and finalize
    /// leaves the job running until an operator invokes this.
    pub async fn reclaim_stale(&self, older_than: chrono::Duration) -> AppResult<u64> {
        let count = self.store.reclaim_stale(Utc::now() - older_than).await?;
        tracing::info!(count, older_than_secs = older_than.num_seconds(), "Reclaimed stale jobs");
        Ok(count)
    }
}
