//! AI job queue management commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use pulse_core::config::AppConfig;
use pulse_core::error::AppError;
use pulse_entity::job::{Job, JobType};
use pulse_worker::WorkerContext;

/// Arguments for worker commands
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Worker subcommand
    #[command(subcommand)]
    pub command: WorkerCommand,
}

/// Worker subcommands
#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Show job counts per status
    Status,
    /// List recently failed jobs with their error messages
    Failed {
        /// Maximum number of jobs to list
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
    /// Reset one job to pending with zero attempts
    Reset {
        /// Job ID
        job_id: Uuid,
    },
    /// Reset every failed job to pending
    ResetFailed,
    /// Return jobs stuck in running to pending
    Reclaim {
        /// Only jobs started at least this many minutes ago
        #[arg(long, default_value_t = 30)]
        older_than_minutes: i64,
    },
    /// Run one batch now
    Run {
        /// Batch size (defaults to worker.batch_size)
        #[arg(short, long)]
        batch_size: Option<i64>,
    },
    /// Enqueue a job (no-op if one exists for the pair)
    Enqueue {
        /// Job type, e.g. PATCH_SUMMARY or patch-summary
        job_type: JobType,
        /// Entity the job operates on
        entity_id: Uuid,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct FailedJobRow {
    id: Uuid,
    #[tabled(rename = "type")]
    job_type: JobType,
    entity_id: Uuid,
    attempts: i32,
    started_at: String,
    error: String,
}

fn display_time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl From<Job> for FailedJobRow {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            job_type: job.job_type,
            entity_id: job.entity_id,
            attempts: job.attempts,
            started_at: display_time(job.started_at),
            error: job.error_message.unwrap_or_default(),
        }
    }
}

/// Execute worker commands
pub async fn execute(
    args: &WorkerArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let ctx = WorkerContext::from_pool(pool.clone(), config)?;

    match &args.command {
        WorkerCommand::Status => {
            let stats = ctx.queue.stats().await?;
            match format {
                OutputFormat::Json => output::print_json(&stats),
                OutputFormat::Table => {
                    println!("AI Job Queue Status:");
                    output::print_kv("Pending", &stats.pending.to_string());
                    output::print_kv("Running", &stats.running.to_string());
                    output::print_kv("Done", &stats.done.to_string());
                    output::print_kv("Failed", &stats.failed.to_string());
                    output::print_kv("Worker Enabled", &config.worker.enabled.to_string());
                    output::print_kv("Schedule", &config.worker.schedule);
                    output::print_kv("Batch Size", &config.worker.batch_size.to_string());
                    output::print_kv("Concurrency", &config.worker.concurrency.to_string());
                }
            }
        }
        WorkerCommand::Failed { limit } => {
            let rows: Vec<FailedJobRow> = ctx
                .queue
                .recent_failed(*limit)
                .await?
                .into_iter()
                .map(FailedJobRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        WorkerCommand::Reset { job_id } => {
            if ctx.queue.reset(*job_id).await? {
                output::print_success(&format!("Job {} reset to pending", job_id));
            } else {
                output::print_warning(&format!(
                    "Job {} was not reset (not found or currently running)",
                    job_id
                ));
            }
        }
        WorkerCommand::ResetFailed => {
            let count = ctx.queue.reset_failed().await?;
            output::print_success(&format!("{} failed job(s) reset to pending", count));
        }
        WorkerCommand::Reclaim { older_than_minutes } => {
            if *older_than_minutes <= 0 {
                return Err(AppError::validation("--older-than-minutes must be positive"));
            }
            let count = ctx
                .queue
                .reclaim_stale(chrono::Duration::minutes(*older_than_minutes))
                .await?;
            output::print_success(&format!("{} stale job(s) returned to pending", count));
        }
        WorkerCommand::Run { batch_size } => {
            let batch_size = batch_size.unwrap_or(config.worker.batch_size);
            let report = ctx.dispatcher.run_batch(batch_size).await?;
            match format {
                OutputFormat::Json => output::print_json(&report),
                OutputFormat::Table => {
                    println!("Batch Report:");
                    output::print_kv("Fetched", &report.fetched.to_string());
                    output::print_kv("Claimed", &report.claimed.to_string());
                    output::print_kv("Processed", &report.processed_count.to_string());
                    output::print_kv("Retried", &report.retried.to_string());
                    output::print_kv("Failed", &report.failed.to_string());
                    output::print_kv("Skipped", &report.skipped.to_string());
                }
            }
        }
        WorkerCommand::Enqueue {
            job_type,
            entity_id,
        } => match ctx.queue.enqueue(*job_type, *entity_id).await? {
            Some(job) => {
                output::print_success(&format!("Job '{}' enqueued (id: {})", job_type, job.id))
            }
            None => output::print_warning(&format!(
                "A {} job already exists for {}; nothing enqueued",
                job_type, entity_id
            )),
        },
    }

    pool.close().await;
    Ok(())
}
