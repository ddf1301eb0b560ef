//! Status of the per-subject discovery queue.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of the last discovery run for a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "discovery_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStatus {
    /// Not checked yet.
    Pending,
    /// At least one event was recorded.
    Found,
    /// Nothing new was recorded.
    NotFound,
}

impl DiscoveryStatus {
    /// Database and wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Found => "found",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for DiscoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
