//! In-memory stores, canned providers and sample rows for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use pulse_core::error::AppError;
use pulse_core::result::AppResult;
use pulse_entity::content::{NewsItem, NewsSummaryUpdate, Patch, PatchSummaryUpdate};
use pulse_entity::discovery::{
    CreateReturnSuggestion, CreateSeasonalEvent, DiscoveryStatus, ReturnSuggestion, SeasonalEvent,
};
use pulse_entity::job::{Job, JobType};
use pulse_entity::subject::{Subject, SubjectStatus};

use crate::executor::{JobExecutionError, JobHandler};
use crate::jobs::HandlerDeps;
use crate::providers::{
    DiscoveredSource, NewsSummarizer, NewsSummary, NewsSummaryRequest, OgImageFetcher,
    PatchSummarizer, PatchSummary, PatchSummaryRequest, ReleaseDiscoverer,
    ReleaseDiscoveryOutcome, ReturnEvaluator, ReturnMatchRequest, ReturnVerdict,
    SeasonalDiscoverer, SeasonalDiscovery, SeasonalDiscoveryRequest, SourceDiscoverer,
    SourceDiscoveryRequest,
};
use crate::repository::{
    DiscoveryQueueStore, NewsStore, PatchStore, ReturnSuggestionStore, SeasonalEventStore,
    SubjectStore,
};

pub fn sample_patch(raw_text: Option<&str>) -> Patch {
    Patch {
        id: Uuid::new_v4(),
        subject_id: Uuid::new_v4(),
        title: "Patch 2.1".to_string(),
        raw_text: raw_text.map(str::to_string),
        source_url: None,
        summary_tldr: None,
        ai_insight: None,
        key_changes: Vec::new(),
        tags: Vec::new(),
        impact_score: None,
        ai_processed_at: None,
        created_at: Utc::now(),
    }
}

pub fn sample_news(raw_content: Option<&str>) -> NewsItem {
    NewsItem {
        id: Uuid::new_v4(),
        subject_id: None,
        title: "Sequel announced".to_string(),
        raw_content: raw_content.map(str::to_string),
        source_url: None,
        image_url: None,
        summary: None,
        why_it_matters: None,
        topics: Vec::new(),
        is_rumor: false,
        ai_processed_at: None,
        created_at: Utc::now(),
    }
}

pub fn sample_subject(id: Uuid, pause_reason: Option<&str>) -> Subject {
    Subject {
        id,
        name: "Starfall Online".to_string(),
        platform: Some("pc".to_string()),
        status: SubjectStatus::Paused,
        pause_reason: pause_reason.map(str::to_string),
        created_at: Utc::now(),
    }
}

/// Content tables kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    pub patches: Arc<DashMap<Uuid, Patch>>,
    pub news: Arc<DashMap<Uuid, NewsItem>>,
    pub subjects: Arc<DashMap<Uuid, Subject>>,
    pub events: Arc<DashMap<(Uuid, String), SeasonalEvent>>,
    pub discovery: Arc<DashMap<Uuid, DiscoveryStatus>>,
    pub suggestions: Arc<DashMap<(Uuid, Uuid), ReturnSuggestion>>,
}

#[async_trait]
impl PatchStore for InMemoryContent {
    async fn find_patch(&self, id: Uuid) -> AppResult<Option<Patch>> {
        Ok(self.patches.get(&id).map(|p| p.clone()))
    }

    async fn apply_patch_summary(&self, id: Uuid, update: &PatchSummaryUpdate) -> AppResult<()> {
        let mut patch = self
            .patches
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Patch {id} not found")))?;
        patch.summary_tldr = Some(update.summary_tldr.clone());
        patch.ai_insight = Some(update.ai_insight.clone());
        patch.key_changes = update.key_changes.clone();
        patch.impact_score = Some(update.impact_score);
        if let Some(tags) = &update.tags {
            patch.tags = tags.clone();
        }
        if let Some(url) = &update.source_url {
            patch.source_url = Some(url.clone());
        }
        patch.ai_processed_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl NewsStore for InMemoryContent {
    async fn find_news(&self, id: Uuid) -> AppResult<Option<NewsItem>> {
        Ok(self.news.get(&id).map(|n| n.clone()))
    }

    async fn apply_news_summary(&self, id: Uuid, update: &NewsSummaryUpdate) -> AppResult<()> {
        let mut item = self
            .news
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("News item {id} not found")))?;
        item.summary = Some(update.summary.clone());
        item.why_it_matters = Some(update.why_it_matters.clone());
        item.topics = update.topics.clone();
        item.is_rumor = update.is_rumor;
        if item.image_url.is_none() {
            item.image_url = update.image_url.clone();
        }
        item.ai_processed_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl SubjectStore for InMemoryContent {
    async fn find_subject(&self, id: Uuid) -> AppResult<Option<Subject>> {
        Ok(self.subjects.get(&id).map(|s| s.clone()))
    }

    async fn find_paused_subjects(&self) -> AppResult<Vec<Subject>> {
        Ok(self
            .subjects
            .iter()
            .filter(|s| s.status == SubjectStatus::Paused)
            .map(|s| s.clone())
            .collect())
    }
}

#[async_trait]
impl SeasonalEventStore for InMemoryContent {
    async fn create_seasonal_event(&self, data: &CreateSeasonalEvent) -> AppResult<SeasonalEvent> {
        let key = (data.subject_id, data.name.clone());
        if self.events.contains_key(&key) {
            return Err(AppError::conflict("Seasonal event already exists"));
        }
        let event = SeasonalEvent {
            id: Uuid::new_v4(),
            subject_id: data.subject_id,
            name: data.name.clone(),
            event_type: data.event_type.clone(),
            starts_on: data.starts_on,
            ends_on: data.ends_on,
            confidence: data.confidence,
            source_url: data.source_url.clone(),
            created_at: Utc::now(),
        };
        self.events.insert(key, event.clone());
        Ok(event)
    }
}

#[async_trait]
impl DiscoveryQueueStore for InMemoryContent {
    async fn record_discovery_outcome(
        &self,
        subject_id: Uuid,
        status: DiscoveryStatus,
        _raw_payload: &serde_json::Value,
    ) -> AppResult<()> {
        self.discovery.insert(subject_id, status);
        Ok(())
    }
}

#[async_trait]
impl ReturnSuggestionStore for InMemoryContent {
    async fn create_return_suggestion(
        &self,
        data: &CreateReturnSuggestion,
    ) -> AppResult<ReturnSuggestion> {
        let key = (data.subject_id, data.patch_id);
        if self.suggestions.contains_key(&key) {
            return Err(AppError::conflict("Return suggestion already exists"));
        }
        let suggestion = ReturnSuggestion {
            id: Uuid::new_v4(),
            subject_id: data.subject_id,
            patch_id: data.patch_id,
            reason: data.reason.clone(),
            confidence: data.confidence,
            created_at: Utc::now(),
        };
        self.suggestions.insert(key, suggestion.clone());
        Ok(suggestion)
    }
}

/// Providers answering every request with fixed, well-formed results.
#[derive(Debug, Clone, Default)]
pub struct CannedProvider;

#[async_trait]
impl PatchSummarizer for CannedProvider {
    async fn summarize_patch(&self, request: &PatchSummaryRequest) -> AppResult<PatchSummary> {
        Ok(PatchSummary {
            summary: format!("{} rebalances ranked play", request.title),
            insight: "Good time to return".to_string(),
            key_changes: vec!["Ranked rework".to_string()],
            tags: vec!["balance".to_string()],
            impact_score: 7.0,
        })
    }
}

#[async_trait]
impl SourceDiscoverer for CannedProvider {
    async fn discover_source(
        &self,
        _request: &SourceDiscoveryRequest,
    ) -> AppResult<DiscoveredSource> {
        Ok(DiscoveredSource {
            url: Some("https://example.com/patch-notes".to_string()),
            confidence: 0.9,
        })
    }
}

#[async_trait]
impl NewsSummarizer for CannedProvider {
    async fn summarize_news(&self, _request: &NewsSummaryRequest) -> AppResult<NewsSummary> {
        Ok(NewsSummary {
            summary: "A sequel is in development".to_string(),
            why_it_matters: "Expect fewer updates to the original".to_string(),
            topics: vec!["sequel".to_string()],
            is_rumor: false,
        })
    }
}

#[async_trait]
impl OgImageFetcher for CannedProvider {
    async fn fetch_og_image(&self, _page_url: &str) -> AppResult<Option<String>> {
        Ok(None)
    }
}

#[async_trait]
impl SeasonalDiscoverer for CannedProvider {
    async fn discover_seasonal(
        &self,
        _request: &SeasonalDiscoveryRequest,
    ) -> AppResult<SeasonalDiscovery> {
        Ok(SeasonalDiscovery {
            candidates: Vec::new(),
            raw: serde_json::json!({ "candidates": [] }),
        })
    }
}

#[async_trait]
impl ReturnEvaluator for CannedProvider {
    async fn evaluate_return(&self, _request: &ReturnMatchRequest) -> AppResult<ReturnVerdict> {
        Ok(ReturnVerdict {
            addresses_pause_reason: true,
            reason: "The patch addresses the pause reason".to_string(),
            confidence: 0.75,
        })
    }
}

#[async_trait]
impl ReleaseDiscoverer for CannedProvider {
    async fn discover_releases(&self, _subject_id: Uuid) -> AppResult<ReleaseDiscoveryOutcome> {
        Ok(ReleaseDiscoveryOutcome {
            success: true,
            error: None,
            releases_found: 0,
        })
    }
}

/// Handler dependencies over in-memory content and canned providers.
pub fn in_memory_deps(content: &InMemoryContent) -> HandlerDeps {
    let content = Arc::new(content.clone());
    let provider = Arc::new(CannedProvider);
    HandlerDeps {
        patches: content.clone(),
        news: content.clone(),
        subjects: content.clone(),
        seasonal_events: content.clone(),
        discovery_queue: content.clone(),
        suggestions: content,
        patch_summarizer: provider.clone(),
        source_discoverer: provider.clone(),
        news_summarizer: provider.clone(),
        og_images: provider.clone(),
        seasonal_discoverer: provider.clone(),
        return_evaluator: provider.clone(),
        release_discoverer: provider,
    }
}

/// Handler that fails its first `failures` executions, then succeeds.
#[derive(Debug)]
pub struct FlakyHandler {
    job_type: JobType,
    failures: u32,
    message: String,
    calls: AtomicU32,
}

impl FlakyHandler {
    pub fn new(job_type: JobType, failures: u32, message: impl Into<String>) -> Self {
        Self {
            job_type,
            failures,
            message: message.into(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn always_failing(job_type: JobType, message: impl Into<String>) -> Self {
        Self::new(job_type, u32::MAX, message)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobHandler for FlakyHandler {
    fn job_type(&self) -> JobType {
        self.job_type
    }

    async fn execute(&self, _job: &Job) -> Result<(), JobExecutionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(JobExecutionError::Transient(self.message.clone()))
        } else {
            Ok(())
        }
    }
}
