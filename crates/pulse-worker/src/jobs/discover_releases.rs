//! DISCOVER_RELEASES handler.

use std::sync::Arc;

use async_trait::async_trait;

use pulse_entity::job::{Job, JobType};

use crate::executor::{JobExecutionError, JobHandler};
use crate::providers::ReleaseDiscoverer;

/// Handles DISCOVER_RELEASES jobs
pub struct DiscoverReleasesJobHandler {
    discoverer: Arc<dyn ReleaseDiscoverer>,
}

impl std::fmt::Debug for DiscoverReleasesJobHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoverReleasesJobHandler")
            .finish_non_exhaustive()
    }
}

impl DiscoverReleasesJobHandler {
    /// Create a new release discovery handler
    pub fn new(discoverer: Arc<dyn ReleaseDiscoverer>) -> Self {
        Self { discoverer }
    }
}

#[async_trait]
impl JobHandler for DiscoverReleasesJobHandler {
    fn job_type(&self) -> JobType {
        JobType::DiscoverReleases
    }

    async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let outcome = self.discoverer.discover_releases(job.entity_id).await?;

        if !outcome.success {
            let message = outcome
                .error
                .filter(|msg| !msg.trim().is_empty())
                .unwrap_or_else(|| "Release discovery failed".to_string());
            return Err(JobExecutionError::Transient(message));
        }

        tracing::info!(
            subject_id = %job.entity_id,
            releases_found = outcome.releases_found,
            "Release discovery finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockReleaseDiscoverer, ReleaseDiscoveryOutcome};
    use uuid::Uuid;

    fn handler(outcome: ReleaseDiscoveryOutcome) -> DiscoverReleasesJobHandler {
        let mut discoverer = MockReleaseDiscoverer::new();
        discoverer
            .expect_discover_releases()
            .returning(move |_| Ok(outcome.clone()));
        DiscoverReleasesJobHandler::new(Arc::new(discoverer))
    }

    #[tokio::test]
    async fn test_reported_failure_uses_provider_message() {
        let handler = handler(ReleaseDiscoveryOutcome {
            success: false,
            error: Some("calendar source unreachable".into()),
            releases_found: 0,
        });
        let err = handler
            .execute(&Job::new_pending(JobType::DiscoverReleases, Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "calendar source unreachable");
    }

    #[tokio::test]
    async fn test_reported_failure_without_message_uses_fallback() {
        let handler = handler(ReleaseDiscoveryOutcome {
            success: false,
            error: None,
            releases_found: 0,
        });
        let err = handler
            .execute(&Job::new_pending(JobType::DiscoverReleases, Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Release discovery failed");
    }

    #[tokio::test]
    async fn test_success() {
        let handler = handler(ReleaseDiscoveryOutcome {
            success: true,
            error: None,
            releases_found: 4,
        });
        assert!(
            handler
                .execute(&Job::new_pending(JobType::DiscoverReleases, Uuid::new_v4()))
                .await
                .is_ok()
        );
    }
}
