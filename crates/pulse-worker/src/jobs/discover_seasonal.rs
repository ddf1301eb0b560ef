//! DISCOVER_SEASONAL handler.

use std::sync::Arc;

use async_trait::async_trait;

use pulse_entity::discovery::{CreateSeasonalEvent, DiscoveryStatus};
use pulse_entity::job::{Job, JobType};

use crate::executor::{JobExecutionError, JobHandler};
use crate::providers::{SeasonalCandidate, SeasonalDiscoverer, SeasonalDiscoveryRequest};
use crate::repository::{DiscoveryQueueStore, SeasonalEventStore, SubjectStore};

/// Candidates below this confidence are discarded.
pub const MIN_CONFIDENCE: f64 = 0.5;

/// Handles DISCOVER_SEASONAL jobs
pub struct DiscoverSeasonalJobHandler {
    subjects: Arc<dyn SubjectStore>,
    events: Arc<dyn SeasonalEventStore>,
    discovery_queue: Arc<dyn DiscoveryQueueStore>,
    discoverer: Arc<dyn SeasonalDiscoverer>,
}

impl std::fmt::Debug for DiscoverSeasonalJobHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoverSeasonalJobHandler")
            .finish_non_exhaustive()
    }
}

impl DiscoverSeasonalJobHandler {
    /// Create a new seasonal discovery handler
    pub fn new(
        subjects: Arc<dyn SubjectStore>,
        events: Arc<dyn SeasonalEventStore>,
        discovery_queue: Arc<dyn DiscoveryQueueStore>,
        discoverer: Arc<dyn SeasonalDiscoverer>,
    ) -> Self {
        Self {
            subjects,
            events,
            discovery_queue,
            discoverer,
        }
    }

    /// Store one candidate. Returns `false` if it already existed.
    async fn create_event(
        &self,
        subject_id: uuid::Uuid,
        candidate: SeasonalCandidate,
    ) -> Result<bool, JobExecutionError> {
        let data = CreateSeasonalEvent {
            subject_id,
            name: candidate.name,
            event_type: candidate.event_type,
            starts_on: candidate.starts_on,
            ends_on: candidate.ends_on,
            confidence: candidate.confidence,
            source_url: candidate.source_url,
        };

        match self.events.create_seasonal_event(&data).await {
            Ok(event) => {
                tracing::debug!(event_id = %event.id, name = %event.name, "Seasonal event created");
                Ok(true)
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(name = %data.name, "Seasonal event already exists");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl JobHandler for DiscoverSeasonalJobHandler {
    fn job_type(&self) -> JobType {
        JobType::DiscoverSeasonal
    }

    async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let subject = self
            .subjects
            .find_subject(job.entity_id)
            .await?
            .ok_or_else(|| {
                JobExecutionError::Transient(format!("Subject {} not found", job.entity_id))
            })?;

        let request = SeasonalDiscoveryRequest {
            subject_id: subject.id,
            name: subject.name.clone(),
            platform: subject.platform.clone(),
        };
        let discovery = self.discoverer.discover_seasonal(&request).await?;

        let candidates = discovery.candidates.len();
        let mut created = 0;
        for candidate in discovery.candidates {
            if candidate.confidence.is_nan() || candidate.confidence < MIN_CONFIDENCE {
                continue;
            }
            if self.create_event(subject.id, candidate).await? {
                created += 1;
            }
        }

        let status = if created > 0 {
            DiscoveryStatus::Found
        } else {
            DiscoveryStatus::NotFound
        };
        self.discovery_queue
            .record_discovery_outcome(subject.id, status, &discovery.raw)
            .await?;

        tracing::info!(
            subject_id = %subject.id,
            candidates,
            created,
            %status,
            "Seasonal discovery finished"
        );
        Ok(())
    }
}
