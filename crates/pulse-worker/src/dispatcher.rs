//! Batch dispatcher: fetch, claim, execute, finalize.

use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tracing::Instrument;

use pulse_core::error::AppError;
use pulse_core::result::AppResult;
use pulse_entity::job::{Job, JobStatus};

use crate::executor::HandlerRegistry;
use crate::policy;
use crate::store::JobStore;

/// Outcome of one [`BatchDispatcher::run_batch`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Pending jobs returned by the fetch.
    pub fetched: usize,
    /// Jobs this call claimed.
    pub claimed: usize,
    /// Jobs that reached `done` in this call.
    pub processed_count: usize,
    /// Failed attempts put back to pending.
    pub retried: usize,
    /// Failed attempts that exhausted the job.
    pub failed: usize,
    /// Jobs claimed elsewhere first, or whose claim errored.
    pub skipped: usize,
}

/// What happened to a single fetched job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Retried,
    Failed,
    Skipped,
}

impl BatchReport {
    fn record(&mut self, outcome: Outcome) {
        if outcome != Outcome::Skipped {
            self.claimed += 1;
        }
        match outcome {
            Outcome::Done => self.processed_count += 1,
            Outcome::Retried => self.retried += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// Runs batches of pending jobs through the handler registry.
///
/// Re-entrant: overlapping calls are safe because each job is claimed
/// with a conditional write before anything else happens to it.
pub struct BatchDispatcher {
    store: Arc<dyn JobStore>,
    registry: Arc<HandlerRegistry>,
    concurrency: usize,
}

impl std::fmt::Debug for BatchDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchDispatcher")
            .field("registry", &self.registry)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl BatchDispatcher {
    /// Create a sequential dispatcher.
    pub fn new(store: Arc<dyn JobStore>, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            store,
            registry,
            concurrency: 1,
        }
    }

    /// Process up to `concurrency` distinct jobs of a batch at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run one batch of at most `batch_size` pending jobs, oldest first.
    ///
    /// A non-positive `batch_size` and an error while fetching the batch are
    /// returned to the caller. Any later error is confined to the job it
    /// happened on.
    pub async fn run_batch(&self, batch_size: i64) -> AppResult<BatchReport> {
        if batch_size <= 0 {
            return Err(AppError::validation(format!(
                "Batch size must be positive, got {batch_size}"
            )));
        }

        let jobs = self.store.fetch_pending(batch_size).await?;
        let mut report = BatchReport {
            fetched: jobs.len(),
            ..BatchReport::default()
        };

        if jobs.is_empty() {
            tracing::debug!(batch_size, "No pending jobs");
            return Ok(report);
        }

        let outcomes: Vec<Outcome> = futures::stream::iter(jobs)
            .map(|job| {
                let span = tracing::info_span!("job", job.id = %job.id, job_type = %job.job_type);
                self.process(job).instrument(span)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            report.record(outcome);
        }

        tracing::info!(
            fetched = report.fetched,
            claimed = report.claimed,
            processed = report.processed_count,
            retried = report.retried,
            failed = report.failed,
            skipped = report.skipped,
            "Batch finished"
        );

        Ok(report)
    }

    async fn process(&self, job: Job) -> Outcome {
        let claimed = match self.store.claim(job.id).await {
            Ok(Some(claimed)) => claimed,
            Ok(None) => {
                tracing::debug!("Job already claimed, skipping");
                return Outcome::Skipped;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to claim job, skipping");
                return Outcome::Skipped;
            }
        };

        match self.registry.execute(&claimed).await {
            Ok(()) => {
                if let Err(e) = self.store.finalize_success(claimed.id).await {
                    tracing::error!(error = %e, "Failed to mark job done");
                    return Outcome::Skipped;
                }
                tracing::info!(attempt = claimed.attempts, "Job completed");
                Outcome::Done
            }
            Err(err) => {
                let status = policy::next_status(claimed.attempts, &err);
                let message = policy::stored_error_message(&err);

                if let Err(e) = self
                    .store
                    .finalize_failure(claimed.id, status, &message)
                    .await
                {
                    tracing::error!(error = %e, "Failed to record job failure");
                    return Outcome::Skipped;
                }

                if status == JobStatus::Failed {
                    tracing::error!(
                        attempt = claimed.attempts,
                        retryable = err.is_retryable(),
                        error = %message,
                        "Job failed"
                    );
                    Outcome::Failed
                } else {
                    tracing::warn!(
                        attempt = claimed.attempts,
                        error = %message,
                        "Job attempt failed, will retry"
                    );
                    Outcome::Retried
                }
            }
        }
    }
}
