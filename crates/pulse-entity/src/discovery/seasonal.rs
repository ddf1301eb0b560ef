//! Seasonal event entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A recurring or limited-time event discovered for a subject.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeasonalEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// Subject the event belongs to.
    pub subject_id: Uuid,
    /// Event name.
    pub name: String,
    /// Free-form category, e.g. `"season"` or `"holiday_event"`.
    pub event_type: String,
    /// First day of the event.
    pub starts_on: Option<NaiveDate>,
    /// Last day of the event.
    pub ends_on: Option<NaiveDate>,
    /// Discovery confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Where the event was announced.
    pub source_url: Option<String>,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Data required to record a seasonal event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSeasonalEvent {
    /// Subject the event belongs to.
    pub subject_id: Uuid,
    /// Event name.
    pub name: String,
    /// Free-form category.
    pub event_type: String,
    /// First day of the event.
    pub starts_on: Option<NaiveDate>,
    /// Last day of the event.
    pub ends_on: Option<NaiveDate>,
    /// Discovery confidence.
    pub confidence: f64,
    /// Where the event was announced.
    pub source_url: Option<String>,
}
