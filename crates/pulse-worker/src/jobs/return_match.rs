//! RETURN_MATCH handler: compare a summarized patch with every paused subject.
//!
//! Individual comparisons may fail without failing the job; only errors
//! loading the patch or the paused subjects do.

use std::sync::Arc;

use async_trait::async_trait;

use pulse_core::error::AppError;
use pulse_entity::content::Patch;
use pulse_entity::discovery::CreateReturnSuggestion;
use pulse_entity::job::{Job, JobType};
use pulse_entity::subject::Subject;

use crate::executor::{JobExecutionError, JobHandler};
use crate::providers::{ReturnEvaluator, ReturnMatchRequest};
use crate::repository::{PatchStore, ReturnSuggestionStore, SubjectStore};

/// Result of matching one patch against the paused subjects.
#[derive(Debug, Default)]
pub struct MatchReport {
    /// Subjects compared.
    pub compared: usize,
    /// Suggestions created.
    pub created: usize,
    /// Per-subject errors, formatted for logging.
    pub errors: Vec<String>,
}

/// Handles RETURN_MATCH jobs
pub struct ReturnMatchJobHandler {
    patches: Arc<dyn PatchStore>,
    subjects: Arc<dyn SubjectStore>,
    suggestions: Arc<dyn ReturnSuggestionStore>,
    evaluator: Arc<dyn ReturnEvaluator>,
}

impl std::fmt::Debug for ReturnMatchJobHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReturnMatchJobHandler").finish_non_exhaustive()
    }
}

impl ReturnMatchJobHandler {
    /// Create a new return match handler
    pub fn new(
        patches: Arc<dyn PatchStore>,
        subjects: Arc<dyn SubjectStore>,
        suggestions: Arc<dyn ReturnSuggestionStore>,
        evaluator: Arc<dyn ReturnEvaluator>,
    ) -> Self {
        Self {
            patches,
            subjects,
            suggestions,
            evaluator,
        }
    }

    /// Match `patch` against every paused subject with a pause reason.
    pub async fn match_patch(&self, patch: &Patch) -> Result<MatchReport, AppError> {
        let paused = self.subjects.find_paused_subjects().await?;
        let mut report = MatchReport::default();

        for subject in &paused {
            let Some(pause_reason) = subject
                .pause_reason
                .as_deref()
                .filter(|reason| !reason.trim().is_empty())
            else {
                continue;
            };

            report.compared += 1;
            match self.compare(patch, subject, pause_reason).await {
                Ok(true) => report.created += 1,
                Ok(false) => {}
                Err(e) => report.errors.push(format!("subject {}: {}", subject.id, e)),
            }
        }

        Ok(report)
    }

    /// Returns `true` if a new suggestion was created.
    async fn compare(
        &self,
        patch: &Patch,
        subject: &Subject,
        pause_reason: &str,
    ) -> Result<bool, AppError> {
        let request = ReturnMatchRequest {
            patch_id: patch.id,
            patch_title: patch.title.clone(),
            patch_summary: patch.summary_tldr.clone(),
            key_changes: patch.key_changes.clone(),
            subject_id: subject.id,
            subject_name: subject.name.clone(),
            pause_reason: pause_reason.to_string(),
        };
        let verdict = self.evaluator.evaluate_return(&request).await?;
        if !verdict.addresses_pause_reason {
            return Ok(false);
        }

        let data = CreateReturnSuggestion {
            subject_id: subject.id,
            patch_id: patch.id,
            reason: verdict.reason,
            confidence: verdict.confidence,
        };
        match self.suggestions.create_return_suggestion(&data).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_conflict() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl JobHandler for ReturnMatchJobHandler {
    fn job_type(&self) -> JobType {
        JobType::ReturnMatch
    }

    async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let patch = self.patches.find_patch(job.entity_id).await?.ok_or_else(|| {
            JobExecutionError::Transient(format!("Patch {} not found", job.entity_id))
        })?;

        let report = self.match_patch(&patch).await?;

        if report.errors.is_empty() {
            tracing::info!(
                patch_id = %patch.id,
                compared = report.compared,
                created = report.created,
                "Return matching finished"
            );
        } else {
            tracing::warn!(
                patch_id = %patch.id,
                compared = report.compared,
                created = report.created,
                errors = ?report.errors,
                "Return matching finished with errors"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockReturnEvaluator, ReturnVerdict};
    use crate::repository::{MockPatchStore, MockReturnSuggestionStore, MockSubjectStore};
    use crate::testing::{sample_patch, sample_subject};
    use chrono::Utc;
    use pulse_entity::discovery::ReturnSuggestion;
    use uuid::Uuid;

    fn patch_store(patch: Patch) -> MockPatchStore {
        let mut patches = MockPatchStore::new();
        patches
            .expect_find_patch()
            .returning(move |_| Ok(Some(patch.clone())));
        patches
    }

    #[tokio::test]
    async fn test_comparison_errors_do_not_fail_job() {
        let patch = sample_patch(Some("Matchmaking rewrite"));
        let patch_id = patch.id;
        let fixed = sample_subject(Uuid::new_v4(), Some("matchmaking is broken"));
        let flaky = sample_subject(Uuid::new_v4(), Some("servers lag"));
        let no_reason = sample_subject(Uuid::new_v4(), None);
        let flaky_id = flaky.id;

        let mut subjects = MockSubjectStore::new();
        let paused = vec![fixed, flaky, no_reason];
        subjects
            .expect_find_paused_subjects()
            .returning(move || Ok(paused.clone()));

        // Matched twice: once directly, once through `execute`.
        let mut evaluator = MockReturnEvaluator::new();
        evaluator.expect_evaluate_return().times(4).returning(move |req| {
            if req.subject_id == flaky_id {
                return Err(AppError::external("evaluator timeout"));
            }
            Ok(ReturnVerdict {
                addresses_pause_reason: true,
                reason: "Matchmaking was rewritten".into(),
                confidence: 0.8,
            })
        });

        let mut suggestions = MockReturnSuggestionStore::new();
        suggestions
            .expect_create_return_suggestion()
            .times(2)
            .returning(|data| {
                Ok(ReturnSuggestion {
                    id: Uuid::new_v4(),
                    subject_id: data.subject_id,
                    patch_id: data.patch_id,
                    reason: data.reason.clone(),
                    confidence: data.confidence,
                    created_at: Utc::now(),
                })
            });

        let handler = ReturnMatchJobHandler::new(
            Arc::new(patch_store(patch.clone())),
            Arc::new(subjects),
            Arc::new(suggestions),
            Arc::new(evaluator),
        );

        let report = handler.match_patch(&patch).await.unwrap();
        assert_eq!(report.compared, 2);
        assert_eq!(report.created, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("evaluator timeout"));

        assert!(
            handler
                .execute(&Job::new_pending(JobType::ReturnMatch, patch_id))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_paused_lookup_error_fails_job() {
        let patch = sample_patch(Some("notes"));
        let patch_id = patch.id;

        let mut subjects = MockSubjectStore::new();
        subjects
            .expect_find_paused_subjects()
            .returning(|| Err(AppError::database("relation does not exist")));

        let handler = ReturnMatchJobHandler::new(
            Arc::new(patch_store(patch)),
            Arc::new(subjects),
            Arc::new(MockReturnSuggestionStore::new()),
            Arc::new(MockReturnEvaluator::new()),
        );
        let err = handler
            .execute(&Job::new_pending(JobType::ReturnMatch, patch_id))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_existing_suggestion_is_not_counted() {
        let patch = sample_patch(Some("notes"));
        let subject = sample_subject(Uuid::new_v4(), Some("too grindy"));

        let mut subjects = MockSubjectStore::new();
        subjects
            .expect_find_paused_subjects()
            .returning(move || Ok(vec![subject.clone()]));
        let mut evaluator = MockReturnEvaluator::new();
        evaluator.expect_evaluate_return().returning(|_| {
            Ok(ReturnVerdict {
                addresses_pause_reason: true,
                reason: "XP doubled".into(),
                confidence: 0.7,
            })
        });
        let mut suggestions = MockReturnSuggestionStore::new();
        suggestions
            .expect_create_return_suggestion()
            .returning(|_| Err(AppError::conflict("duplicate")));

        let handler = ReturnMatchJobHandler::new(
            Arc::new(MockPatchStore::new()),
            Arc::new(subjects),
            Arc::new(suggestions),
            Arc::new(evaluator),
        );
        let report = handler.match_patch(&patch).await.unwrap();
        assert_eq!(report.created, 0);
        assert!(report.errors.is_empty());
    }
}
