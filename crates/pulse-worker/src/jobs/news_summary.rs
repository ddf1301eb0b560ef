//! NEWS_SUMMARY handler.

use std::sync::Arc;

use async_trait::async_trait;

use pulse_entity::content::{NewsItem, NewsSummaryUpdate};
use pulse_entity::job::{Job, JobType};

use crate::executor::{JobExecutionError, JobHandler};
use crate::providers::{NewsSummarizer, NewsSummary, NewsSummaryRequest, OgImageFetcher};
use crate::repository::NewsStore;
use crate::util::{best_effort, truncate_chars};

pub const SUMMARY_MAX_CHARS: usize = 450;
pub const WHY_IT_MATTERS_MAX_CHARS: usize = 300;
pub const MAX_TOPICS: usize = 3;

/// Handles NEWS_SUMMARY jobs
pub struct NewsSummaryJobHandler {
    news: Arc<dyn NewsStore>,
    summarizer: Arc<dyn NewsSummarizer>,
    og_images: Arc<dyn OgImageFetcher>,
}

impl std::fmt::Debug for NewsSummaryJobHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsSummaryJobHandler").finish_non_exhaustive()
    }
}

impl NewsSummaryJobHandler {
    /// Create a new news summary handler
    pub fn new(
        news: Arc<dyn NewsStore>,
        summarizer: Arc<dyn NewsSummarizer>,
        og_images: Arc<dyn OgImageFetcher>,
    ) -> Self {
        Self {
            news,
            summarizer,
            og_images,
        }
    }

    /// The page's og:image when the item has no image yet.
    async fn missing_image(&self, item: &NewsItem) -> Option<String> {
        if item.image_url.is_some() {
            return None;
        }
        let source_url = item.source_url.as_deref()?;
        best_effort("news_og_image", self.og_images.fetch_og_image(source_url))
            .await
            .flatten()
    }
}

fn build_update(summary: NewsSummary, image_url: Option<String>) -> NewsSummaryUpdate {
    NewsSummaryUpdate {
        summary: truncate_chars(summary.summary.trim(), SUMMARY_MAX_CHARS),
        why_it_matters: truncate_chars(summary.why_it_matters.trim(), WHY_IT_MATTERS_MAX_CHARS),
        topics: summary.topics.into_iter().take(MAX_TOPICS).collect(),
        is_rumor: summary.is_rumor,
        image_url,
    }
}

#[async_trait]
impl JobHandler for NewsSummaryJobHandler {
    fn job_type(&self) -> JobType {
        JobType::NewsSummary
    }

    async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let item = self.news.find_news(job.entity_id).await?.ok_or_else(|| {
            JobExecutionError::Transient(format!("News item {} not found", job.entity_id))
        })?;

        let raw_text = item.usable_raw_content().ok_or_else(|| {
            JobExecutionError::Transient(format!(
                "News item {} has no raw text to summarize",
                item.id
            ))
        })?;

        let request = NewsSummaryRequest {
            news_id: item.id,
            title: item.title.clone(),
            raw_text: raw_text.to_string(),
            source_url: item.source_url.clone(),
        };
        let summary = self.summarizer.summarize_news(&request).await?;
        let image_url = self.missing_image(&item).await;

        let update = build_update(summary, image_url);
        self.news.apply_news_summary(item.id, &update).await?;

        tracing::info!(
            news_id = %item.id,
            is_rumor = update.is_rumor,
            image_found = update.image_url.is_some(),
            "News item summarized"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockNewsSummarizer, MockOgImageFetcher};
    use crate::repository::MockNewsStore;
    use crate::testing::sample_news;
    use pulse_core::error::AppError;

    fn summary() -> NewsSummary {
        NewsSummary {
            summary: "a".repeat(500),
            why_it_matters: "b".repeat(301),
            topics: vec!["esports".into(), "roadmap".into(), "dlc".into(), "pricing".into()],
            is_rumor: true,
        }
    }

    #[test]
    fn test_build_update_limits() {
        let update = build_update(summary(), None);
        assert_eq!(update.summary.chars().count(), SUMMARY_MAX_CHARS);
        assert_eq!(update.why_it_matters.chars().count(), WHY_IT_MATTERS_MAX_CHARS);
        assert_eq!(update.topics, vec!["esports", "roadmap", "dlc"]);
        assert!(update.is_rumor);
    }

    #[tokio::test]
    async fn test_og_image_error_is_swallowed() {
        let mut item = sample_news(Some("Studio confirms season two"));
        item.source_url = Some("https://news.example.com/s2".into());
        let news_id = item.id;

        let mut news = MockNewsStore::new();
        news.expect_find_news()
            .returning(move |_| Ok(Some(item.clone())));
        news.expect_apply_news_summary()
            .withf(|_, update| update.image_url.is_none())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut summarizer = MockNewsSummarizer::new();
        summarizer.expect_summarize_news().returning(|_| Ok(summary()));

        let mut og_images = MockOgImageFetcher::new();
        og_images
            .expect_fetch_og_image()
            .times(1)
            .returning(|_| Err(AppError::external("403 Forbidden")));

        let handler =
            NewsSummaryJobHandler::new(Arc::new(news), Arc::new(summarizer), Arc::new(og_images));
        handler
            .execute(&Job::new_pending(JobType::NewsSummary, news_id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_existing_image_skips_fetch() {
        let mut item = sample_news(Some("Balance update"));
        item.source_url = Some("https://news.example.com/balance".into());
        item.image_url = Some("https://cdn.example.com/kept.png".into());
        let news_id = item.id;

        let mut news = MockNewsStore::new();
        news.expect_find_news()
            .returning(move |_| Ok(Some(item.clone())));
        news.expect_apply_news_summary().returning(|_, _| Ok(()));

        let mut summarizer = MockNewsSummarizer::new();
        summarizer.expect_summarize_news().returning(|_| Ok(summary()));

        let mut og_images = MockOgImageFetcher::new();
        og_images.expect_fetch_og_image().never();

        let handler =
            NewsSummaryJobHandler::new(Arc::new(news), Arc::new(summarizer), Arc::new(og_images));
        assert!(
            handler
                .execute(&Job::new_pending(JobType::NewsSummary, news_id))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_summarizer_error_propagates() {
        let item = sample_news(Some("Leak"));
        let news_id = item.id;

        let mut news = MockNewsStore::new();
        news.expect_find_news()
            .returning(move |_| Ok(Some(item.clone())));
        news.expect_apply_news_summary().never();

        let mut summarizer = MockNewsSummarizer::new();
        summarizer
            .expect_summarize_news()
            .returning(|_| Err(AppError::external("model overloaded")));

        let handler = NewsSummaryJobHandler::new(
            Arc::new(news),
            Arc::new(summarizer),
            Arc::new(MockOgImageFetcher::new()),
        );
        let err = handler
            .execute(&Job::new_pending(JobType::NewsSummary, news_id))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.message().contains("model overloaded"));
    }

    #[tokio::test]
    async fn test_persistence_error_is_retryable() {
        let item = sample_news(Some("Roadmap announced"));
        let news_id = item.id;

        let mut news = MockNewsStore::new();
        news.expect_find_news()
            .returning(move |_| Ok(Some(item.clone())));
        news.expect_apply_news_summary()
            .times(1)
            .returning(|_, _| Err(AppError::database("could not serialize access")));

        let mut summarizer = MockNewsSummarizer::new();
        summarizer.expect_summarize_news().returning(|_| Ok(summary()));
        let mut og_images = MockOgImageFetcher::new();
        og_images.expect_fetch_og_image().never();

        let handler =
            NewsSummaryJobHandler::new(Arc::new(news), Arc::new(summarizer), Arc::new(og_images));
        let err = handler
            .execute(&Job::new_pending(JobType::NewsSummary, news_id))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.message().contains("could not serialize access"));
    }
}
