//! AI job domain entities.

pub mod kind;
pub mod model;
pub mod status;

pub use kind::JobType;
pub use model::{Job, JobStats};
pub use status::JobStatus;
