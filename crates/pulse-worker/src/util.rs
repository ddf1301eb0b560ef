//! Small helpers shared by the dispatcher and the job handlers.

use std::future::Future;

use pulse_core::result::AppResult;

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Run an auxiliary operation whose failure must not fail the enclosing job.
///
/// Errors are logged as warnings and turned into `None`.
pub async fn best_effort<T, F>(operation: &str, future: F) -> Option<T>
where
    F: Future<Output = AppResult<T>>,
{
    match future.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation, error = %e, "Best-effort operation failed, continuing");
            None
        }
    }
}
