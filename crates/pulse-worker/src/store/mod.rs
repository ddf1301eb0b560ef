//! Job store abstraction and its implementations.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pulse_core::result::AppResult;
use pulse_entity::job::{Job, JobStats, JobStatus, JobType};

pub use memory::MemoryJobStore;

/// Durable storage of jobs with conditional status updates.
///
/// Implementations must guarantee that at most one job exists per
/// `(job_type, entity_id)` and that `claim` is atomic: of several concurrent
/// claims on the same pending job, exactly one returns the row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a pending job unless one exists for the pair in any status.
    async fn insert_if_absent(&self, job_type: JobType, entity_id: Uuid) -> AppResult<Option<Job>>;

    /// Up to `limit` pending jobs, oldest `created_at` first.
    async fn fetch_pending(&self, limit: i64) -> AppResult<Vec<Job>>;

    /// Move a pending job to running, incrementing its attempts.
    ///
    /// Returns the claimed job, or `None` if it was no longer pending.
    async fn claim(&self, job_id: Uuid) -> AppResult<Option<Job>>;

    /// Mark a job done and clear its error message.
    async fn finalize_success(&self, job_id: Uuid) -> AppResult<()>;

    /// Store the outcome of a failed attempt.
    async fn finalize_failure(
        &self,
        job_id: Uuid,
        status: JobStatus,
        error_message: &str,
    ) -> AppResult<()>;

    /// Operator reset of a job that is not running: pending, zero attempts,
    /// no error message. Returns `false` if nothing was reset.
    async fn reset_to_pending(&self, job_id: Uuid) -> AppResult<bool>;

    /// Operator reset of every failed job.
    async fn reset_failed(&self) -> AppResult<u64>;

    /// Operator recovery of jobs left running since before `started_before`.
    async fn reclaim_stale(&self, started_before: DateTime<Utc>) -> AppResult<u64>;

    /// Number of jobs per status.
    async fn count_by_status(&self) -> AppResult<JobStats>;

    /// Most recently attempted failed jobs.
    async fn recent_failed(&self, limit: i64) -> AppResult<Vec<Job>>;
}
