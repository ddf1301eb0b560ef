//! News item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A news item about one or more subjects.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsItem {
    /// Unique news identifier.
    pub id: Uuid,
    /// Subject the item is about, if known.
    pub subject_id: Option<Uuid>,
    /// Headline.
    pub title: String,
    /// Staged raw article text awaiting summarization.
    pub raw_content: Option<String>,
    /// Article URL.
    pub source_url: Option<String>,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// AI summary.
    pub summary: Option<String>,
    /// Why the news matters to a player.
    pub why_it_matters: Option<String>,
    /// Topics extracted by the summarizer.
    pub topics: Vec<String>,
    /// Whether the summarizer flagged the item as a rumor.
    pub is_rumor: bool,
    /// When AI enrichment last completed.
    pub ai_processed_at: Option<DateTime<Utc>>,
    /// When the item was ingested.
    pub created_at: DateTime<Utc>,
}

impl NewsItem {
    /// Staged raw content if present and not blank.
    pub fn usable_raw_content(&self) -> Option<&str> {
        self.raw_content
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Fields written back after summarizing a news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSummaryUpdate {
    /// Summary, at most 450 characters.
    pub summary: String,
    /// Why it matters, at most 300 characters.
    pub why_it_matters: String,
    /// Up to three topics.
    pub topics: Vec<String>,
    /// Rumor flag.
    pub is_rumor: bool,
    /// Discovered cover image, only when the item had none.
    pub image_url: Option<String>,
}
