//! Return suggestion entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A suggestion that a patch addresses why a subject was paused.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReturnSuggestion {
    /// Unique suggestion identifier.
    pub id: Uuid,
    /// Paused subject.
    pub subject_id: Uuid,
    /// Patch that may address the pause reason.
    pub patch_id: Uuid,
    /// Explanation shown to the user.
    pub reason: String,
    /// Match confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// When the suggestion was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a return suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReturnSuggestion {
    /// Paused subject.
    pub subject_id: Uuid,
    /// Matching patch.
    pub patch_id: Uuid,
    /// Explanation shown to the user.
    pub reason: String,
    /// Match confidence.
    pub confidence: f64,
}
