//! Subject entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::SubjectStatus;

/// A game tracked by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Platform the subject is played on.
    pub platform: Option<String>,
    /// Play status.
    pub status: SubjectStatus,
    /// Why the user paused, when paused.
    pub pause_reason: Option<String>,
    /// When the subject started being tracked.
    pub created_at: DateTime<Utc>,
}
