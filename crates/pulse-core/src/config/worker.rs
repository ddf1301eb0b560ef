//! Background worker configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// AI job worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the periodic batch trigger is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of pending jobs fetched per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    /// Number of jobs of one batch processed at the same time.
    ///
    /// `1` processes a batch strictly sequentially.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Cron expression (with seconds) for the periodic batch trigger.
    #[serde(default = "default_schedule")]
    pub schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            schedule: default_schedule(),
        }
    }
}

impl WorkerConfig {
    /// Reject settings the dispatcher cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.batch_size <= 0 {
            return Err(AppError::configuration(format!(
                "worker.batch_size must be positive, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> i64 {
    10
}

fn default_concurrency() -> usize {
    1
}

fn default_schedule() -> String {
    "0 */5 * * * *".to_string()
}
