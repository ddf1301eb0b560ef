//! In-memory job store backed by `DashMap`.
//!
//! Mirrors the PostgreSQL store: the key index plays the role of the
//! `(job_type, entity_id)` unique constraint and every transition happens
//! under the entry's shard lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use pulse_core::error::AppError;
use pulse_core::result::AppResult;
use pulse_entity::job::{Job, JobStats, JobStatus, JobType};

use super::JobStore;

#[derive(Debug, Clone)]
struct StoredJob {
    /// Insertion order, breaks `created_at` ties.
    seq: u64,
    job: Job,
}

/// In-memory [`JobStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    jobs: Arc<DashMap<Uuid, StoredJob>>,
    keys: Arc<DashMap<(JobType, Uuid), Uuid>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryJobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a job by ID.
    pub fn get(&self, job_id: Uuid) -> Option<Job> {
        self.jobs.get(&job_id).map(|entry| entry.job.clone())
    }

    /// Get the job of a `(job_type, entity_id)` pair.
    pub fn find_by_key(&self, job_type: JobType, entity_id: Uuid) -> Option<Job> {
        let job_id = *self.keys.get(&(job_type, entity_id))?;
        self.get(job_id)
    }

    /// Number of stored jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the store holds no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn update<F>(&self, job_id: Uuid, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut Job),
    {
        let mut entry = self
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::not_found(format!("Job {job_id} not found")))?;
        apply(&mut entry.job);
        Ok(())
    }
}

fn reset(job: &mut Job) {
    job.status = JobStatus::Pending;
    job.attempts = 0;
    job.error_message = None;
    job.started_at = None;
    job.completed_at = None;
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert_if_absent(&self, job_type: JobType, entity_id: Uuid) -> AppResult<Option<Job>> {
        match self.keys.entry((job_type, entity_id)) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                let job = Job::new_pending(job_type, entity_id);
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                self.jobs.insert(
                    job.id,
                    StoredJob {
                        seq,
                        job: job.clone(),
                    },
                );
                slot.insert(job.id);
                Ok(Some(job))
            }
        }
    }

    async fn fetch_pending(&self, limit: i64) -> AppResult<Vec<Job>> {
        let mut pending: Vec<StoredJob> = self
            .jobs
            .iter()
            .filter(|entry| entry.job.status == JobStatus::Pending)
            .map(|entry| entry.value().clone())
            .collect();
        pending.sort_by_key(|stored| (stored.job.created_at, stored.seq));

        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(pending
            .into_iter()
            .take(limit)
            .map(|stored| stored.job)
            .collect())
    }

    async fn claim(&self, job_id: Uuid) -> AppResult<Option<Job>> {
        let Some(mut entry) = self.jobs.get_mut(&job_id) else {
            return Ok(None);
        };
        if entry.job.status != JobStatus::Pending {
            return Ok(None);
        }
        entry.job.status = JobStatus::Running;
        entry.job.started_at = Some(Utc::now());
        entry.job.attempts += 1;
        Ok(Some(entry.job.clone()))
    }

    async fn finalize_success(&self, job_id: Uuid) -> AppResult<()> {
        self.update(job_id, |job| {
            job.status = JobStatus::Done;
            job.error_message = None;
            job.completed_at = Some(Utc::now());
        })
    }

    async fn finalize_failure(
        &self,
        job_id: Uuid,
        status: JobStatus,
        error_message: &str,
    ) -> AppResult<()> {
        self.update(job_id, |job| {
            job.status = status;
            job.error_message = Some(error_message.to_string());
        })
    }

    async fn reset_to_pending(&self, job_id: Uuid) -> AppResult<bool> {
        let Some(mut entry) = self.jobs.get_mut(&job_id) else {
            return Ok(false);
        };
        if entry.job.status == JobStatus::Running {
            return Ok(false);
        }
        reset(&mut entry.job);
        Ok(true)
    }

    async fn reset_failed(&self) -> AppResult<u64> {
        let mut count = 0;
        for mut entry in self.jobs.iter_mut() {
            if entry.job.status == JobStatus::Failed {
                reset(&mut entry.job);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn reclaim_stale(&self, started_before: DateTime<Utc>) -> AppResult<u64> {
        let mut count = 0;
        for mut entry in self.jobs.iter_mut() {
            let stale = entry.job.status == JobStatus::Running
                && entry.job.started_at.is_some_and(|at| at < started_before);
            if stale {
                entry.job.status = JobStatus::Pending;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn count_by_status(&self) -> AppResult<JobStats> {
        let mut stats = JobStats::default();
        for entry in self.jobs.iter() {
            stats.add(entry.job.status, 1);
        }
        Ok(stats)
    }

    async fn recent_failed(&self, limit: i64) -> AppResult<Vec<Job>> {
        let mut failed: Vec<Job> = self
            .jobs
            .iter()
            .filter(|entry| entry.job.status == JobStatus::Failed)
            .map(|entry| entry.job.clone())
            .collect();
        failed.sort_by_key(|job| std::cmp::Reverse(job.started_at.unwrap_or(job.created_at)));
        failed.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let store = MemoryJobStore::new();
        let entity = Uuid::new_v4();

        let first = store
            .insert_if_absent(JobType::PatchSummary, entity)
            .await
            .unwrap();
        let second = store
            .insert_if_absent(JobType::PatchSummary, entity)
            .await
            .unwrap();

        let first = first.expect("first insert creates a job");
        assert_eq!(first.status, JobStatus::Pending);
        assert_eq!(first.attempts, 0);
        assert!(second.is_none());
        assert_eq!(store.len(), 1);

        // Same entity, different type is a different job.
        assert!(
            store
                .insert_if_absent(JobType::ReturnMatch, entity)
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_pending_is_fifo_and_limited() {
        let store = MemoryJobStore::new();
        let mut ids = Vec::new();
        for _ in 0..4 {
            let job = store
                .insert_if_absent(JobType::NewsSummary, Uuid::new_v4())
                .await
                .unwrap()
                .unwrap();
            ids.push(job.id);
        }
        store.claim(ids[1]).await.unwrap();

        let pending = store.fetch_pending(2).await.unwrap();
        let pending_ids: Vec<Uuid> = pending.iter().map(|job| job.id).collect();
        assert_eq!(pending_ids, vec![ids[0], ids[2]]);
    }

    #[tokio::test]
    async fn test_claim_only_succeeds_on_pending() {
        let store = MemoryJobStore::new();
        let job = store
            .insert_if_absent(JobType::DiscoverSeasonal, Uuid::new_v4())
            .await
            .unwrap()
            .unwrap();

        let claimed = store.claim(job.id).await.unwrap().expect("claimed");
        assert_eq!(claimed.status, JobStatus::Running);
        assert_eq!(claimed.attempts, 1);
        assert!(claimed.started_at.is_some());

        assert!(store.claim(job.id).await.unwrap().is_none());
        assert!(store.claim(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_to_pending_skips_running_jobs() {
        let store = MemoryJobStore::new();
        let job = store
            .insert_if_absent(JobType::DiscoverReleases, Uuid::new_v4())
            .await
            .unwrap()
            .unwrap();
        store.claim(job.id).await.unwrap();
        assert!(!store.reset_to_pending(job.id).await.unwrap());

        store
            .finalize_failure(job.id, JobStatus::Failed, "provider down")
            .await
            .unwrap();
        assert!(store.reset_to_pending(job.id).await.unwrap());

        let reset = store.get(job.id).unwrap();
        assert_eq!(reset.status, JobStatus::Pending);
        assert_eq!(reset.attempts, 0);
        assert!(reset.error_message.is_none());
    }

    #[tokio::test]
    async fn test_reclaim_stale_keeps_attempts() {
        let store = MemoryJobStore::new();
        let job = store
            .insert_if_absent(JobType::ReturnMatch, Uuid::new_v4())
            .await
            .unwrap()
            .unwrap();
        store.claim(job.id).await.unwrap();

        let none = store
            .reclaim_stale(Utc::now() - Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(none, 0);

        let reclaimed = store
            .reclaim_stale(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(reclaimed, 1);

        let job = store.get(job.id).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 1);
    }

    #[tokio::test]
    async fn test_stats_and_recent_failed() {
        let store = MemoryJobStore::new();
        for job_type in JobType::ALL {
            store
                .insert_if_absent(job_type, Uuid::new_v4())
                .await
                .unwrap();
        }
        let failed = store.fetch_pending(1).await.unwrap().remove(0);
        store.claim(failed.id).await.unwrap();
        store
            .finalize_failure(failed.id, JobStatus::Failed, "boom")
            .await
            .unwrap();

        let stats = store.count_by_status().await.unwrap();
        assert_eq!(stats.pending, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total(), 5);

        let recent = store.recent_failed(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].error_message.as_deref(), Some("boom"));
    }
}
