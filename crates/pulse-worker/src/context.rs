//! Wiring of stores, providers, handlers and the dispatcher.

use std::sync::Arc;

use sqlx::PgPool;

use pulse_core::config::AppConfig;
use pulse_core::result::AppResult;
use pulse_database::repositories::{
    DiscoveryQueueRepository, JobRepository, NewsRepository, PatchRepository,
    ReturnSuggestionRepository, SeasonalEventRepository, SubjectRepository,
};

use crate::dispatcher::BatchDispatcher;
use crate::jobs::{HandlerDeps, default_registry};
use crate::providers::HttpProvider;
use crate::queue::JobQueue;
use crate::store::JobStore;

/// Everything a process needs to enqueue and run AI jobs.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    /// Enqueueing and operator operations.
    pub queue: JobQueue,
    /// Batch runner.
    pub dispatcher: Arc<BatchDispatcher>,
}

impl WorkerContext {
    /// Build a context over an arbitrary job store and handler dependencies.
    pub fn new(store: Arc<dyn JobStore>, deps: &HandlerDeps, concurrency: usize) -> Self {
        let queue = JobQueue::new(Arc::clone(&store));
        let registry = Arc::new(default_registry(deps, queue.clone()));
        let dispatcher =
            Arc::new(BatchDispatcher::new(store, registry).with_concurrency(concurrency));
        Self { queue, dispatcher }
    }

    /// Build the PostgreSQL-backed context with the HTTP AI gateway.
    pub fn from_pool(pool: PgPool, config: &AppConfig) -> AppResult<Self> {
        let provider = Arc::new(HttpProvider::new(&config.providers)?);

        let deps = HandlerDeps {
            patches: Arc::new(PatchRepository::new(pool.clone())),
            news: Arc::new(NewsRepository::new(pool.clone())),
            subjects: Arc::new(SubjectRepository::new(pool.clone())),
            seasonal_events: Arc::new(SeasonalEventRepository::new(pool.clone())),
            discovery_queue: Arc::new(DiscoveryQueueRepository::new(pool.clone())),
            suggestions: Arc::new(ReturnSuggestionRepository::new(pool.clone())),
            patch_summarizer: provider.clone(),
            source_discoverer: provider.clone(),
            news_summarizer: provider.clone(),
            og_images: provider.clone(),
            seasonal_discoverer: provider.clone(),
            return_evaluator: provider.clone(),
            release_discoverer: provider,
        };

        let store: Arc<dyn JobStore> = Arc::new(JobRepository::new(pool));
        Ok(Self::new(store, &deps, config.worker.concurrency))
    }
}
