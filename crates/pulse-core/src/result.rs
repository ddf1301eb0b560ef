//! Convenience result type alias for Pulse.

use crate::error::AppError;

/// A specialized `Result` type for Pulse operations.
pub type AppResult<T> = Result<T, AppError>;
