//! AI enrichment job queue for Pulse.
//!
//! This crate provides:
//! - An idempotent job queue keyed by `(job type, entity id)`
//! - A batch dispatcher that claims, executes, and finalizes pending jobs
//! - A retry policy bounding every job to a fixed number of attempts
//! - The five enrichment handlers and the provider interfaces they call
//! - A cron trigger that runs batches periodically

pub mod context;
pub mod dispatcher;
pub mod executor;
pub mod jobs;
pub mod policy;
pub mod providers;
pub mod queue;
pub mod repository;
pub mod scheduler;
pub mod store;
pub mod util;

#[cfg(test)]
mod testing;

pub use context::WorkerContext;
pub use dispatcher::{BatchDispatcher, BatchReport};
pub use executor::{HandlerRegistry, JobExecutionError, JobHandler};
pub use queue::JobQueue;
pub use scheduler::CronScheduler;
pub use store::{JobStore, MemoryJobStore};
