//! Entities produced by discovery and matching jobs.

pub mod queue;
pub mod seasonal;
pub mod suggestion;

pub use queue::DiscoveryStatus;
pub use seasonal::{CreateSeasonalEvent, SeasonalEvent};
pub use suggestion::{CreateReturnSuggestion, ReturnSuggestion};
