//! Repository implementations for the job queue and enriched content.

pub mod discovery_queue;
pub mod job;
pub mod news;
pub mod patch;
pub mod seasonal;
pub mod subject;
pub mod suggestion;

pub use discovery_queue::DiscoveryQueueRepository;
pub use job::JobRepository;
pub use news::NewsRepository;
pub use patch::PatchRepository;
pub use seasonal::SeasonalEventRepository;
pub use subject::SubjectRepository;
pub use suggestion::ReturnSuggestionRepository;

use pulse_core::error::{AppError, ErrorKind};

/// Map an insert error, reporting unique violations as [`ErrorKind::Conflict`].
pub(crate) fn map_insert_error(err: sqlx::Error, message: &str) -> AppError {
    let is_unique_violation = matches!(
        &err,
        sqlx::Error::Database(db) if db.is_unique_violation()
    );
    if is_unique_violation {
        AppError::with_source(ErrorKind::Conflict, format!("{message}: already exists"), err)
    } else {
        AppError::with_source(ErrorKind::Database, message, err)
    }
}
