//! Narrow per-entity persistence interfaces injected into job handlers.

use async_trait::async_trait;
use uuid::Uuid;

use pulse_core::result::AppResult;
use pulse_entity::content::{NewsItem, NewsSummaryUpdate, Patch, PatchSummaryUpdate};
use pulse_entity::discovery::{
    CreateReturnSuggestion, CreateSeasonalEvent, DiscoveryStatus, ReturnSuggestion, SeasonalEvent,
};
use pulse_entity::subject::Subject;

/// Patch reads and summary write-back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatchStore: Send + Sync {
    /// Load a patch.
    async fn find_patch(&self, id: Uuid) -> AppResult<Option<Patch>>;

    /// Persist summary fields of a patch.
    async fn apply_patch_summary(&self, id: Uuid, update: &PatchSummaryUpdate) -> AppResult<()>;
}

/// News item reads and summary write-back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Load a news item.
    async fn find_news(&self, id: Uuid) -> AppResult<Option<NewsItem>>;

    /// Persist summary fields of a news item.
    async fn apply_news_summary(&self, id: Uuid, update: &NewsSummaryUpdate) -> AppResult<()>;
}

/// Subject reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// Load a subject.
    async fn find_subject(&self, id: Uuid) -> AppResult<Option<Subject>>;

    /// Every subject currently paused.
    async fn find_paused_subjects(&self) -> AppResult<Vec<Subject>>;
}

/// Seasonal event creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeasonalEventStore: Send + Sync {
    /// Record an event; a duplicate yields a conflict error.
    async fn create_seasonal_event(&self, data: &CreateSeasonalEvent) -> AppResult<SeasonalEvent>;
}

/// Discovery queue bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscoveryQueueStore: Send + Sync {
    /// Record the outcome of a discovery run for a subject.
    async fn record_discovery_outcome(
        &self,
        subject_id: Uuid,
        status: DiscoveryStatus,
        raw_payload: &serde_json::Value,
    ) -> AppResult<()>;
}

/// Return suggestion creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReturnSuggestionStore: Send + Sync {
    /// Create a suggestion; a duplicate yields a conflict error.
    async fn create_return_suggestion(
        &self,
        data: &CreateReturnSuggestion,
    ) -> AppResult<ReturnSuggestion>;
}
