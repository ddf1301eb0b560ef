//! Patch note entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A patch or update record for a subject.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patch {
    /// Unique patch identifier.
    pub id: Uuid,
    /// Subject the patch belongs to.
    pub subject_id: Uuid,
    /// Patch title as ingested.
    pub title: String,
    /// Raw patch note text.
    pub raw_text: Option<String>,
    /// Where the patch notes were published.
    pub source_url: Option<String>,
    /// One-line AI summary.
    pub summary_tldr: Option<String>,
    /// Short AI insight.
    pub ai_insight: Option<String>,
    /// Notable changes extracted by the summarizer.
    pub key_changes: Vec<String>,
    /// Tags; may be curated by a human.
    pub tags: Vec<String>,
    /// Impact score in `1..=10`.
    pub impact_score: Option<i32>,
    /// When AI enrichment last completed.
    pub ai_processed_at: Option<DateTime<Utc>>,
    /// When the patch was ingested.
    pub created_at: DateTime<Utc>,
}

impl Patch {
    /// Raw text if present and not blank.
    pub fn usable_raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref().filter(|text| !text.trim().is_empty())
    }
}

/// Fields written back after summarizing a patch.
///
/// `tags` and `source_url` are `None` when the existing value must be kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchSummaryUpdate {
    /// One-line summary, at most 280 characters.
    pub summary_tldr: String,
    /// Insight string, at most 120 characters.
    pub ai_insight: String,
    /// Notable changes.
    pub key_changes: Vec<String>,
    /// Impact score in `1..=10`.
    pub impact_score: i32,
    /// Tags to set, only when the patch had none.
    pub tags: Option<Vec<String>>,
    /// Discovered source URL, only when the patch had none.
    pub source_url: Option<String>,
}
