//! PostgreSQL-backed implementations of the worker's store interfaces.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pulse_core::result::AppResult;
use pulse_database::repositories::{
    DiscoveryQueueRepository, JobRepository, NewsRepository, PatchRepository,
    ReturnSuggestionRepository, SeasonalEventRepository, SubjectRepository,
};
use pulse_entity::content::{NewsItem, NewsSummaryUpdate, Patch, PatchSummaryUpdate};
use pulse_entity::discovery::{
    CreateReturnSuggestion, CreateSeasonalEvent, DiscoveryStatus, ReturnSuggestion, SeasonalEvent,
};
use pulse_entity::job::{Job, JobStats, JobStatus, JobType};
use pulse_entity::subject::Subject;

use super::JobStore;
use crate::repository::{
    DiscoveryQueueStore, NewsStore, PatchStore, ReturnSuggestionStore, SeasonalEventStore,
    SubjectStore,
};

#[async_trait]
impl JobStore for JobRepository {
    async fn insert_if_absent(&self, job_type: JobType, entity_id: Uuid) -> AppResult<Option<Job>> {
        JobRepository::insert_if_absent(self, job_type, entity_id).await
    }

    async fn fetch_pending(&self, limit: i64) -> AppResult<Vec<Job>> {
        JobRepository::fetch_pending(self, limit).await
    }

    async fn claim(&self, job_id: Uuid) -> AppResult<Option<Job>> {
        JobRepository::claim(self, job_id).await
    }

    async fn finalize_success(&self, job_id: Uuid) -> AppResult<()> {
        JobRepository::finalize_success(self, job_id).await
    }

    async fn finalize_failure(
        &self,
        job_id: Uuid,
        status: JobStatus,
        error_message: &str,
    ) -> AppResult<()> {
        JobRepository::finalize_failure(self, job_id, status, error_message).await
    }

    async fn reset_to_pending(&self, job_id: Uuid) -> AppResult<bool> {
        JobRepository::reset_to_pending(self, job_id).await
    }

    async fn reset_failed(&self) -> AppResult<u64> {
        JobRepository::reset_failed(self).await
    }

    async fn reclaim_stale(&self, started_before: DateTime<Utc>) -> AppResult<u64> {
        JobRepository::reclaim_stale(self, started_before).await
    }

    async fn count_by_status(&self) -> AppResult<JobStats> {
        JobRepository::count_by_status(self).await
    }

    async fn recent_failed(&self, limit: i64) -> AppResult<Vec<Job>> {
        JobRepository::recent_failed(self, limit).await
    }
}

#[async_trait]
impl PatchStore for PatchRepository {
    async fn find_patch(&self, id: Uuid) -> AppResult<Option<Patch>> {
        self.find_by_id(id).await
    }

    async fn apply_patch_summary(&self, id: Uuid, update: &PatchSummaryUpdate) -> AppResult<()> {
        self.apply_summary(id, update).await
    }
}

#[async_trait]
impl NewsStore for NewsRepository {
    async fn find_news(&self, id: Uuid) -> AppResult<Option<NewsItem>> {
        self.find_by_id(id).await
    }

    async fn apply_news_summary(&self, id: Uuid, update: &NewsSummaryUpdate) -> AppResult<()> {
        self.apply_summary(id, update).await
    }
}

#[async_trait]
impl SubjectStore for SubjectRepository {
    async fn find_subject(&self, id: Uuid) -> AppResult<Option<Subject>> {
        self.find_by_id(id).await
    }

    async fn find_paused_subjects(&self) -> AppResult<Vec<Subject>> {
        self.find_paused().await
    }
}

#[async_trait]
impl SeasonalEventStore for SeasonalEventRepository {
    async fn create_seasonal_event(&self, data: &CreateSeasonalEvent) -> AppResult<SeasonalEvent> {
        self.create(data).await
    }
}

#[async_trait]
impl DiscoveryQueueStore for DiscoveryQueueRepository {
    async fn record_discovery_outcome(
        &self,
        subject_id: Uuid,
        status: DiscoveryStatus,
        raw_payload: &serde_json::Value,
    ) -> AppResult<()> {
        self.record_outcome(subject_id, status, raw_payload).await
    }
}

#[async_trait]
impl ReturnSuggestionStore for ReturnSuggestionRepository {
    async fn create_return_suggestion(
        &self,
        data: &CreateReturnSuggestion,
    ) -> AppResult<ReturnSuggestion> {
        self.create(data).await
    }
}
