//! PATCH_SUMMARY handler: summarize a patch and chain a return match.

use std::sync::Arc;

use async_trait::async_trait;

use pulse_entity::content::{Patch, PatchSummaryUpdate};
use pulse_entity::job::{Job, JobType};

use crate::executor::{JobExecutionError, JobHandler};
use crate::providers::{
    PatchSummarizer, PatchSummary, PatchSummaryRequest, SourceDiscoverer, SourceDiscoveryRequest,
};
use crate::queue::JobQueue;
use crate::repository::PatchStore;
use crate::util::{best_effort, truncate_chars};

/// Maximum characters of the one-line summary.
pub const SUMMARY_MAX_CHARS: usize = 280;
/// Maximum characters of the insight.
pub const INSIGHT_MAX_CHARS: usize = 120;
/// Maximum number of tags kept.
pub const MAX_TAGS: usize = 4;
/// Minimum confidence for a discovered source URL to be stored.
pub const SOURCE_MIN_CONFIDENCE: f64 = 0.6;

/// Handles PATCH_SUMMARY jobs
pub struct PatchSummaryJobHandler {
    patches: Arc<dyn PatchStore>,
    summarizer: Arc<dyn PatchSummarizer>,
    source_discoverer: Arc<dyn SourceDiscoverer>,
    queue: JobQueue,
}

impl std::fmt::Debug for PatchSummaryJobHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchSummaryJobHandler").finish_non_exhaustive()
    }
}

impl PatchSummaryJobHandler {
    /// Create a new patch summary handler
    pub fn new(
        patches: Arc<dyn PatchStore>,
        summarizer: Arc<dyn PatchSummarizer>,
        source_discoverer: Arc<dyn SourceDiscoverer>,
        queue: JobQueue,
    ) -> Self {
        Self {
            patches,
            summarizer,
            source_discoverer,
            queue,
        }
    }

    /// Look for a source URL, ignoring errors and low-confidence answers.
    async fn discover_source(&self, patch: &Patch) -> Option<String> {
        let request = SourceDiscoveryRequest {
            patch_id: patch.id,
            title: patch.title.clone(),
        };
        let found = best_effort(
            "patch_source_discovery",
            self.source_discoverer.discover_source(&request),
        )
        .await?;

        match found.url {
            Some(url) if found.confidence >= SOURCE_MIN_CONFIDENCE && !url.trim().is_empty() => {
                Some(url)
            }
            _ => {
                tracing::debug!(
                    patch_id = %patch.id,
                    confidence = found.confidence,
                    "Discarding discovered source"
                );
                None
            }
        }
    }
}

/// Clamp a provider score to an integer in `1..=10`.
pub fn clamp_impact(score: f64) -> i32 {
    if score.is_nan() {
        return 1;
    }
    score.round().clamp(1.0, 10.0) as i32
}

/// Build the update written back to the patch.
///
/// Summary fields always overwrite; tags only fill an empty list.
fn build_update(
    patch: &Patch,
    summary: PatchSummary,
    source_url: Option<String>,
) -> PatchSummaryUpdate {
    let tags = patch.tags.is_empty().then(|| {
        summary
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .take(MAX_TAGS)
            .collect()
    });

    PatchSummaryUpdate {
        summary_tldr: truncate_chars(summary.summary.trim(), SUMMARY_MAX_CHARS),
        ai_insight: truncate_chars(summary.insight.trim(), INSIGHT_MAX_CHARS),
        key_changes: summary.key_changes,
        impact_score: clamp_impact(summary.impact_score),
        tags,
        source_url,
    }
}

#[async_trait]
impl JobHandler for PatchSummaryJobHandler {
    fn job_type(&self) -> JobType {
        JobType::PatchSummary
    }

    async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let patch = self.patches.find_patch(job.entity_id).await?.ok_or_else(|| {
            JobExecutionError::Transient(format!("Patch {} not found", job.entity_id))
        })?;

        let raw_text = patch.usable_raw_text().ok_or_else(|| {
            JobExecutionError::Transient(format!(
                "Patch {} has no raw text to summarize",
                patch.id
            ))
        })?;

        let request = PatchSummaryRequest {
            patch_id: patch.id,
            title: patch.title.clone(),
            raw_text: raw_text.to_string(),
            source_url: patch.source_url.clone(),
        };
        let summary = self.summarizer.summarize_patch(&request).await?;

        let source_url = match patch.source_url {
            Some(_) => None,
            None => self.discover_source(&patch).await,
        };

        let update = build_update(&patch, summary, source_url);
        self.patches.apply_patch_summary(patch.id, &update).await?;

        tracing::info!(
            patch_id = %patch.id,
            impact_score = update.impact_score,
            source_found = update.source_url.is_some(),
            "Patch summarized"
        );

        self.queue.enqueue(JobType::ReturnMatch, patch.id).await?;
        Ok(())
    }
}
