//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::JobType;
use super::status::JobStatus;

/// An AI enrichment job.
///
/// At most one job exists per `(job_type, entity_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Unique job identifier.
    pub id: Uuid,
    /// Kind of work to perform.
    pub job_type: JobType,
    /// Row the job operates on; interpretation depends on `job_type`.
    pub entity_id: Uuid,
    /// Current job status.
    pub status: JobStatus,
    /// Number of times the job has been claimed.
    pub attempts: i32,
    /// Last failure message, at most 900 characters.
    pub error_message: Option<String>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last claimed.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job finished successfully.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Build a fresh pending job.
    pub fn new_pending(job_type: JobType, entity_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type,
            entity_id,
            status: JobStatus::Pending,
            attempts: 0,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

/// Number of jobs per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    /// Jobs waiting to be claimed.
    pub pending: i64,
    /// Jobs currently claimed.
    pub running: i64,
    /// Successfully completed jobs.
    pub done: i64,
    /// Jobs that exhausted their attempts.
    pub failed: i64,
}

impl JobStats {
    /// Record `count` jobs in `status`.
    pub fn add(&mut self, status: JobStatus, count: i64) {
        match status {
            JobStatus::Pending => self.pending += count,
            JobStatus::Running => self.running += count,
            JobStatus::Done => self.done += count,
            JobStatus::Failed => self.failed += count,
        }
    }

    /// Total number of jobs.
    pub fn total(&self) -> i64 {
        self.pending + self.running + self.done + self.failed
    }
}
