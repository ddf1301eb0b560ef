//! The closed set of AI job types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use pulse_core::error::AppError;

/// Kind of enrichment work a job performs.
///
/// The meaning of a job's `entity_id` depends on its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ai_job_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    /// Summarize a patch. `entity_id` is a patch.
    PatchSummary,
    /// Summarize a news item. `entity_id` is a news item.
    NewsSummary,
    /// Discover seasonal events. `entity_id` is a subject.
    DiscoverSeasonal,
    /// Match a patch against paused subjects. `entity_id` is a patch.
    ReturnMatch,
    /// Discover upcoming releases. `entity_id` is a subject.
    DiscoverReleases,
}

impl JobType {
    /// Every job type.
    pub const ALL: [Self; 5] = [
        Self::PatchSummary,
        Self::NewsSummary,
        Self::DiscoverSeasonal,
        Self::ReturnMatch,
        Self::DiscoverReleases,
    ];

    /// Return the wire name of the job type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatchSummary => "PATCH_SUMMARY",
            Self::NewsSummary => "NEWS_SUMMARY",
            Self::DiscoverSeasonal => "DISCOVER_SEASONAL",
            Self::ReturnMatch => "RETURN_MATCH",
            Self::DiscoverReleases => "DISCOVER_RELEASES",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| AppError::validation(format!("Unknown job type '{s}'")))
    }
}
