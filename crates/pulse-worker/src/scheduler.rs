//! Cron trigger that runs dispatcher batches periodically.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use pulse_core::config::WorkerConfig;
use pulse_core::error::AppError;

use crate::dispatcher::BatchDispatcher;

/// Cron-based scheduler for periodic batch runs
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Dispatcher invoked on every tick
    dispatcher: Arc<BatchDispatcher>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(dispatcher: Arc<BatchDispatcher>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            dispatcher,
        })
    }

    /// Register the batch run on `config.schedule`.
    ///
    /// A tick may fire while the previous batch is still running; the
    /// claim check keeps the two runs from processing the same job.
    pub async fn register_batch_run(&self, config: &WorkerConfig) -> Result<(), AppError> {
        config.validate()?;
        let dispatcher = Arc::clone(&self.dispatcher);
        let batch_size = config.batch_size;

        let job = CronJob::new_async(config.schedule.as_str(), move |_uuid, _lock| {
            let dispatcher = Arc::clone(&dispatcher);
            Box::pin(async move {
                tracing::debug!(batch_size, "Scheduled batch run starting");
                if let Err(e) = dispatcher.run_batch(batch_size).await {
                    tracing::error!(error = %e, "Scheduled batch run failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid worker schedule '{}': {}",
                config.schedule, e
            ))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add batch schedule: {}", e)))?;

        tracing::info!(schedule = %config.schedule, batch_size, "Registered: batch run");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
