//! Ingested content rows enriched by AI jobs.

pub mod news;
pub mod patch;

pub use news::{NewsItem, NewsSummaryUpdate};
pub use patch::{Patch, PatchSummaryUpdate};
