//! Tracked subject entities.

pub mod model;
pub mod status;

pub use model::Subject;
pub use status::SubjectStatus;
