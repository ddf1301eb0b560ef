//! News item repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use pulse_core::error::{AppError, ErrorKind};
use pulse_core::result::AppResult;
use pulse_entity::content::{NewsItem, NewsSummaryUpdate};

/// Repository for news items.
#[derive(Debug, Clone)]
pub struct NewsRepository {
    pool: PgPool,
}

impl NewsRepository {
    /// Create a new news repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a news item by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NewsItem>> {
        sqlx::query_as::<_, NewsItem>("SELECT * FROM news_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find news item", e))
    }

    /// Write summary fields back to a news item.
    ///
    /// The image is only written when the update carries one and the row
    /// still has none.
    pub async fn apply_summary(&self, id: Uuid, update: &NewsSummaryUpdate) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE news_items SET summary = $2, why_it_matters = $3, topics = $4, \
             is_rumor = $5, image_url = COALESCE(image_url, $6), ai_processed_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.summary)
        .bind(&update.why_it_matters)
        .bind(&update.topics)
        .bind(update.is_rumor)
        .bind(&update.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update news item", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("News item {id} not found")));
        }
        Ok(())
    }
}
