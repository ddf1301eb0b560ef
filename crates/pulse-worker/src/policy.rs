//! Retry/failure policy applied when a handler fails.

use pulse_entity::job::JobStatus;

use crate::executor::JobExecutionError;
use crate::util::truncate_chars;

/// Total number of claims a job gets before it is marked failed.
pub const MAX_ATTEMPTS: i32 = 3;

/// Maximum length, in characters, of a stored error message.
pub const MAX_ERROR_MESSAGE_CHARS: usize = 900;

/// Status of a job whose handler failed, from its attempts after the claim.
pub fn decide(attempts_after_claim: i32) -> JobStatus {
    if attempts_after_claim >= MAX_ATTEMPTS {
        JobStatus::Failed
    } else {
        JobStatus::Pending
    }
}

/// Status of a failed job, failing immediately on non-retryable errors.
pub fn next_status(attempts_after_claim: i32, error: &JobExecutionError) -> JobStatus {
    if error.is_retryable() {
        decide(attempts_after_claim)
    } else {
        JobStatus::Failed
    }
}

/// Error message as persisted on the job row.
pub fn stored_error_message(error: &JobExecutionError) -> String {
    truncate_chars(&error.message(), MAX_ERROR_MESSAGE_CHARS)
}
