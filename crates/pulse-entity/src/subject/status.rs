//! Subject play status.

use serde::{Deserialize, Serialize};

/// Play status of a tracked subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subject_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubjectStatus {
    /// Actively played.
    Playing,
    /// Put aside, usually with a pause reason.
    Paused,
    /// Finished or dropped for good.
    Finished,
}
