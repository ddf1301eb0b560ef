//! AI provider interfaces consumed by the job handlers.
//!
//! Providers are request/response functions over typed values; none of
//! them persist anything except [`ReleaseDiscoverer`], which stores its
//! findings itself and only reports a summary.

pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pulse_core::result::AppResult;

pub use http::HttpProvider;

/// Patch fields sent to the summarizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchSummaryRequest {
    /// Patch identifier.
    pub patch_id: Uuid,
    /// Patch title.
    pub title: String,
    /// Raw patch note text.
    pub raw_text: String,
    /// Source URL, if known.
    pub source_url: Option<String>,
}

/// Summarizer output for a patch, before truncation and clamping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatchSummary {
    /// One-line summary.
    pub summary: String,
    /// Short insight.
    pub insight: String,
    /// Notable changes.
    #[serde(default)]
    pub key_changes: Vec<String>,
    /// Suggested tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Impact score, nominally `1..=10`.
    pub impact_score: f64,
}

/// Request for locating where a patch was published.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDiscoveryRequest {
    /// Patch identifier.
    pub patch_id: Uuid,
    /// Patch title.
    pub title: String,
}

/// A discovered source URL with the provider's confidence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscoveredSource {
    /// Candidate URL.
    pub url: Option<String>,
    /// Confidence in `0.0..=1.0`.
    #[serde(default)]
    pub confidence: f64,
}

/// News fields sent to the summarizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsSummaryRequest {
    /// News item identifier.
    pub news_id: Uuid,
    /// Headline.
    pub title: String,
    /// Raw article text.
    pub raw_text: String,
    /// Article URL.
    pub source_url: Option<String>,
}

/// Summarizer output for a news item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewsSummary {
    /// Summary.
    pub summary: String,
    /// Why it matters.
    pub why_it_matters: String,
    /// Topics.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Rumor flag.
    #[serde(default)]
    pub is_rumor: bool,
}

/// Subject fields sent to seasonal discovery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalDiscoveryRequest {
    /// Subject identifier.
    pub subject_id: Uuid,
    /// Subject name.
    pub name: String,
    /// Platform, if known.
    pub platform: Option<String>,
}

/// One candidate seasonal event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeasonalCandidate {
    /// Event name.
    pub name: String,
    /// Free-form category.
    #[serde(default = "default_event_type")]
    pub event_type: String,
    /// First day.
    pub starts_on: Option<NaiveDate>,
    /// Last day.
    pub ends_on: Option<NaiveDate>,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Announcement URL.
    pub source_url: Option<String>,
}

fn default_event_type() -> String {
    "event".to_string()
}

/// Seasonal discovery result with the raw payload kept for bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalDiscovery {
    /// Parsed candidates.
    pub candidates: Vec<SeasonalCandidate>,
    /// Payload as returned by the provider.
    pub raw: serde_json::Value,
}

/// Patch and paused subject compared by the return evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnMatchRequest {
    /// Patch identifier.
    pub patch_id: Uuid,
    /// Patch title.
    pub patch_title: String,
    /// Patch summary, if already summarized.
    pub patch_summary: Option<String>,
    /// Notable changes of the patch.
    pub key_changes: Vec<String>,
    /// Paused subject identifier.
    pub subject_id: Uuid,
    /// Paused subject name.
    pub subject_name: String,
    /// Why the subject was paused.
    pub pause_reason: String,
}

/// Whether a patch addresses a pause reason.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReturnVerdict {
    /// The patch addresses the pause reason.
    pub addresses_pause_reason: bool,
    /// Explanation shown to the user.
    #[serde(default)]
    pub reason: String,
    /// Confidence in `0.0..=1.0`.
    #[serde(default)]
    pub confidence: f64,
}

/// Summary reported by release discovery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseDiscoveryOutcome {
    /// Whether the run succeeded.
    pub success: bool,
    /// Error reported on failure.
    #[serde(default)]
    pub error: Option<String>,
    /// Number of releases stored by the provider.
    #[serde(default)]
    pub releases_found: u32,
}

/// Produces patch summaries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatchSummarizer: Send + Sync {
    /// Summarize a patch.
    async fn summarize_patch(&self, request: &PatchSummaryRequest) -> AppResult<PatchSummary>;
}

/// Locates where a patch was published.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceDiscoverer: Send + Sync {
    /// Look for the source URL of a patch.
    async fn discover_source(&self, request: &SourceDiscoveryRequest)
    -> AppResult<DiscoveredSource>;
}

/// Produces news summaries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSummarizer: Send + Sync {
    /// Summarize a news item.
    async fn summarize_news(&self, request: &NewsSummaryRequest) -> AppResult<NewsSummary>;
}

/// Reads the `og:image` of a web page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OgImageFetcher: Send + Sync {
    /// The page's `og:image` URL, if it declares one.
    async fn fetch_og_image(&self, page_url: &str) -> AppResult<Option<String>>;
}

/// Finds seasonal events of a subject.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeasonalDiscoverer: Send + Sync {
    /// Discover candidate seasonal events.
    async fn discover_seasonal(
        &self,
        request: &SeasonalDiscoveryRequest,
    ) -> AppResult<SeasonalDiscovery>;
}

/// Decides whether a patch addresses a pause reason.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReturnEvaluator: Send + Sync {
    /// Compare one patch with one paused subject.
    async fn evaluate_return(&self, request: &ReturnMatchRequest) -> AppResult<ReturnVerdict>;
}

/// Finds and stores upcoming releases of a subject.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseDiscoverer: Send + Sync {
    /// Discover releases; results are persisted by the provider.
    async fn discover_releases(&self, subject_id: Uuid) -> AppResult<ReleaseDiscoveryOutcome>;
}
