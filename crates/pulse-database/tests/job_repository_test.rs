//! PostgreSQL tests for the job repository.
//!
//! Run with a database available:
//! `DATABASE_URL=postgres://... cargo test -p pulse-database -- --ignored`

use uuid::Uuid;

use pulse_core::config::DatabaseConfig;
use pulse_database::DatabasePool;
use pulse_database::migration::run_migrations;
use pulse_database::repositories::JobRepository;
use pulse_entity::job::{JobStatus, JobType};

async fn repository() -> JobRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = DatabaseConfig::new(url);
    let db = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    run_migrations(db.pool())
        .await
        .expect("Failed to run migrations");
    JobRepository::new(db.into_pool())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_if_absent_is_idempotent() {
    let repo = repository().await;
    let entity = Uuid::new_v4();

    let first = repo
        .insert_if_absent(JobType::PatchSummary, entity)
        .await
        .unwrap();
    let second = repo
        .insert_if_absent(JobType::PatchSummary, entity)
        .await
        .unwrap();

    let first = first.expect("first insert creates a row");
    assert_eq!(first.status, JobStatus::Pending);
    assert!(second.is_none());

    let found = repo
        .find_by_key(JobType::PatchSummary, entity)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_claims_have_one_winner() {
    let repo = repository().await;
    let job = repo
        .insert_if_absent(JobType::NewsSummary, Uuid::new_v4())
        .await
        .unwrap()
        .unwrap();

    let claims: Vec<_> = (0..8)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.claim(job.id).await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for claim in claims {
        if claim.await.unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    let claimed = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(claimed.status, JobStatus::Running);
    assert_eq!(claimed.attempts, 1);
    assert!(claimed.started_at.is_some());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_failure_then_reset() {
    let repo = repository().await;
    let job = repo
        .insert_if_absent(JobType::DiscoverReleases, Uuid::new_v4())
        .await
        .unwrap()
        .unwrap();

    repo.claim(job.id).await.unwrap().unwrap();
    assert!(!repo.reset_to_pending(job.id).await.unwrap());

    repo.finalize_failure(job.id, JobStatus::Failed, "provider down")
        .await
        .unwrap();
    let failed = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.error_message.as_deref(), Some("provider down"));

    assert!(repo.reset_to_pending(job.id).await.unwrap());
    let reset = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(reset.status, JobStatus::Pending);
    assert_eq!(reset.attempts, 0);
    assert!(reset.error_message.is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_finalize_success_clears_error() {
    let repo = repository().await;
    let job = repo
        .insert_if_absent(JobType::ReturnMatch, Uuid::new_v4())
        .await
        .unwrap()
        .unwrap();

    repo.claim(job.id).await.unwrap().unwrap();
    repo.finalize_failure(job.id, JobStatus::Pending, "timeout")
        .await
        .unwrap();
    repo.claim(job.id).await.unwrap().unwrap();
    repo.finalize_success(job.id).await.unwrap();

    let done = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Done);
    assert_eq!(done.attempts, 2);
    assert!(done.error_message.is_none());
    assert!(done.completed_at.is_some());
}
