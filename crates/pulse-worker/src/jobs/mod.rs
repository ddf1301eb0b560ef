//! Built-in job handler implementations.

pub mod discover_releases;
pub mod discover_seasonal;
pub mod news_summary;
pub mod patch_summary;
pub mod return_match;

use std::sync::Arc;

pub use discover_releases::DiscoverReleasesJobHandler;
pub use discover_seasonal::DiscoverSeasonalJobHandler;
pub use news_summary::NewsSummaryJobHandler;
pub use patch_summary::PatchSummaryJobHandler;
pub use return_match::ReturnMatchJobHandler;

use crate::executor::HandlerRegistry;
use crate::providers::{
    NewsSummarizer, OgImageFetcher, PatchSummarizer, ReleaseDiscoverer, ReturnEvaluator,
    SeasonalDiscoverer, SourceDiscoverer,
};
use crate::queue::JobQueue;
use crate::repository::{
    DiscoveryQueueStore, NewsStore, PatchStore, ReturnSuggestionStore, SeasonalEventStore,
    SubjectStore,
};

/// Stores and providers the handlers are built from.
#[derive(Clone)]
pub struct HandlerDeps {
    pub patches: Arc<dyn PatchStore>,
    pub news: Arc<dyn NewsStore>,
    pub subjects: Arc<dyn SubjectStore>,
    pub seasonal_events: Arc<dyn SeasonalEventStore>,
    pub discovery_queue: Arc<dyn DiscoveryQueueStore>,
    pub suggestions: Arc<dyn ReturnSuggestionStore>,
    pub patch_summarizer: Arc<dyn PatchSummarizer>,
    pub source_discoverer: Arc<dyn SourceDiscoverer>,
    pub news_summarizer: Arc<dyn NewsSummarizer>,
    pub og_images: Arc<dyn OgImageFetcher>,
    pub seasonal_discoverer: Arc<dyn SeasonalDiscoverer>,
    pub return_evaluator: Arc<dyn ReturnEvaluator>,
    pub release_discoverer: Arc<dyn ReleaseDiscoverer>,
}

/// Registry with one handler per job type.
///
/// `queue` is used by handlers that chain follow-up jobs.
pub fn default_registry(deps: &HandlerDeps, queue: JobQueue) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    registry.register(Arc::new(PatchSummaryJobHandler::new(
        Arc::clone(&deps.patches),
        Arc::clone(&deps.patch_summarizer),
        Arc::clone(&deps.source_discoverer),
        queue,
    )));
    registry.register(Arc::new(NewsSummaryJobHandler::new(
        Arc::clone(&deps.news),
        Arc::clone(&deps.news_summarizer),
        Arc::clone(&deps.og_images),
    )));
    registry.register(Arc::new(DiscoverSeasonalJobHandler::new(
        Arc::clone(&deps.subjects),
        Arc::clone(&deps.seasonal_events),
        Arc::clone(&deps.discovery_queue),
        Arc::clone(&deps.seasonal_discoverer),
    )));
    registry.register(Arc::new(ReturnMatchJobHandler::new(
        Arc::clone(&deps.patches),
        Arc::clone(&deps.subjects),
        Arc::clone(&deps.suggestions),
        Arc::clone(&deps.return_evaluator),
    )));
    registry.register(Arc::new(DiscoverReleasesJobHandler::new(Arc::clone(
        &deps.release_discoverer,
    ))));

    registry
}
