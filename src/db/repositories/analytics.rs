//! Analytics repository
//!
//! Append-only event rows plus the aggregate reads the reports need.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{EventTarget, EventType, TopArticle};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn record(&self, event_type: EventType, target: EventTarget) -> Result<()>;

    /// All events of a type
    async fn count(&self, event_type: EventType) -> Result<i64>;

    /// Events of a type at or after `since`
    async fn count_since(&self, event_type: EventType, since: DateTime<Utc>) -> Result<i64>;

    /// Timestamps of events of a type at or after `since`, oldest first
    async fn timestamps_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>>;

    /// Articles with the most events of a type
    async fn top_articles(&self, event_type: EventType, limit: i64) -> Result<Vec<TopArticle>>;
}

pub struct SqlxAnalyticsRepository {
    pool: DynDatabasePool,
}

impl SqlxAnalyticsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AnalyticsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[derive(Debug, FromRow)]
struct TopArticleRow {
    article_id: i64,
    title: String,
    views: i64,
}

impl From<TopArticleRow> for TopArticle {
    fn from(row: TopArticleRow) -> Self {
        TopArticle {
            article_id: row.article_id,
            title: row.title,
            views: row.views,
        }
    }
}

fn target_ids(target: EventTarget) -> (Option<i64>, Option<i64>) {
    match target {
        EventTarget::Article(id) => (Some(id), None),
        EventTarget::Video(id) => (None, Some(id)),
    }
}

#[async_trait]
impl AnalyticsRepository for SqlxAnalyticsRepository {
    async fn record(&self, event_type: EventType, target: EventTarget) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                record_event_sqlite(self.pool.sqlite()?, event_type, target).await
            }
            DatabaseDriver::Mysql => record_event_mysql(self.pool.mysql()?, event_type, target).await,
        }
    }

    async fn count(&self, event_type: EventType) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_all_events_sqlite(self.pool.sqlite()?, event_type).await,
            DatabaseDriver::Mysql => count_all_events_mysql(self.pool.mysql()?, event_type).await,
        }
    }

    async fn count_since(&self, event_type: EventType, since: DateTime<Utc>) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_events_sqlite(self.pool.sqlite()?, event_type, since).await
            }
            DatabaseDriver::Mysql => count_events_mysql(self.pool.mysql()?, event_type, since).await,
        }
    }

    async fn timestamps_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                event_times_sqlite(self.pool.sqlite()?, event_type, since).await
            }
            DatabaseDriver::Mysql => event_times_mysql(self.pool.mysql()?, event_type, since).await,
        }
    }

    async fn top_articles(&self, event_type: EventType, limit: i64) -> Result<Vec<TopArticle>> {
        let rows = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                top_articles_sqlite(self.pool.sqlite()?, event_type, limit).await?
            }
            DatabaseDriver::Mysql => {
                top_articles_mysql(self.pool.mysql()?, event_type, limit).await?
            }
        };
        Ok(rows.into_iter().map(TopArticle::from).collect())
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn record_event_sqlite(
    pool: &SqlitePool,
    event_type: EventType,
    target: EventTarget,
) -> Result<()> {
    let (article_id, video_id) = target_ids(target);
    sqlx::query(
        "INSERT INTO analytics (event_type, article_id, video_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(event_type.as_str())
    .bind(article_id)
    .bind(video_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to record analytics event")?;
    Ok(())
}

async fn count_all_events_sqlite(pool: &SqlitePool, event_type: EventType) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analytics WHERE event_type = ?")
        .bind(event_type.as_str())
        .fetch_one(pool)
        .await
        .context("Failed to count analytics events")
}

async fn count_events_sqlite(
    pool: &SqlitePool,
    event_type: EventType,
    since: DateTime<Utc>,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM analytics WHERE event_type = ? AND created_at >= ?",
    )
    .bind(event_type.as_str())
    .bind(since)
    .fetch_one(pool)
    .await
    .context("Failed to count analytics events")
}

async fn event_times_sqlite(
    pool: &SqlitePool,
    event_type: EventType,
    since: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>> {
    sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT created_at FROM analytics WHERE event_type = ? AND created_at >= ? ORDER BY created_at ASC",
    )
    .bind(event_type.as_str())
    .bind(since)
    .fetch_all(pool)
    .await
    .context("Failed to load analytics timestamps")
}

async fn top_articles_sqlite(
    pool: &SqlitePool,
    event_type: EventType,
    limit: i64,
) -> Result<Vec<TopArticleRow>> {
    sqlx::query_as::<_, TopArticleRow>(
        r#"
        SELECT a.id AS article_id, a.title AS title, COUNT(e.id) AS views
        FROM analytics e
        JOIN articles a ON a.id = e.article_id
        WHERE e.event_type = ?
        GROUP BY a.id, a.title
        ORDER BY views DESC, a.id ASC
        LIMIT ?
        "#,
    )
    .bind(event_type.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to load top articles")
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn record_event_mysql(
    pool: &MySqlPool,
    event_type: EventType,
    target: EventTarget,
) -> Result<()> {
    let (article_id, video_id) = target_ids(target);
    sqlx::query(
        "INSERT INTO analytics (event_type, article_id, video_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(event_type.as_str())
    .bind(article_id)
    .bind(video_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to record analytics event")?;
    Ok(())
}

async fn count_all_events_mysql(pool: &MySqlPool, event_type: EventType) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analytics WHERE event_type = ?")
        .bind(event_type.as_str())
        .fetch_one(pool)
        .await
        .context("Failed to count analytics events")
}

async fn count_events_mysql(
    pool: &MySqlPool,
    event_type: EventType,
    since: DateTime<Utc>,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM analytics WHERE event_type = ? AND created_at >= ?",
    )
    .bind(event_type.as_str())
    .bind(since)
    .fetch_one(pool)
    .await
    .context("Failed to count analytics events")
}

async fn event_times_mysql(
    pool: &MySqlPool,
    event_type: EventType,
    since: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>> {
    sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT created_at FROM analytics WHERE event_type = ? AND created_at >= ? ORDER BY created_at ASC",
    )
    .bind(event_type.as_str())
    .bind(since)
    .fetch_all(pool)
    .await
    .context("Failed to load analytics timestamps")
}

async fn top_articles_mysql(
    pool: &MySqlPool,
    event_type: EventType,
    limit: i64,
) -> Result<Vec<TopArticleRow>> {
    sqlx::query_as::<_, TopArticleRow>(
        r#"
        SELECT a.id AS article_id, a.title AS title, COUNT(e.id) AS views
        FROM analytics e
        JOIN articles a ON a.id = e.article_id
        WHERE e.event_type = ?
        GROUP BY a.id, a.title
        ORDER BY views DESC, a.id ASC
        LIMIT ?
        "#,
    )
    .bind(event_type.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to load top articles")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup() -> SqlxAnalyticsRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        pool.execute(
            "INSERT INTO users (username, email, password_hash) VALUES ('desk', 'desk@example.in', 'x')",
        )
        .await
        .unwrap();
        pool.execute(
            "INSERT INTO articles (title, slug, content, author_id) VALUES \
             ('Election results', 'election-results', 'Body', 1), \
             ('Match report', 'match-report', 'Body', 1)",
        )
        .await
        .unwrap();
        pool.execute("INSERT INTO videos (title, video_url) VALUES ('Clip', 'https://youtu.be/x')")
            .await
            .unwrap();
        SqlxAnalyticsRepository::new(pool)
    }

    #[tokio::test]
    async fn test_record_and_count() {
        let repo = setup().await;
        repo.record(EventType::View, EventTarget::Article(1)).await.unwrap();
        repo.record(EventType::View, EventTarget::Video(1)).await.unwrap();

        assert_eq!(repo.count(EventType::View).await.unwrap(), 2);
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(repo.count_since(EventType::View, future).await.unwrap(), 0);

        let week_ago = Utc::now() - Duration::days(7);
        let times = repo.timestamps_since(EventType::View, week_ago).await.unwrap();
        assert_eq!(times.len(), 2);
    }

    #[tokio::test]
    async fn test_top_articles_ranked_by_views() {
        let repo = setup().await;
        repo.record(EventType::View, EventTarget::Article(1)).await.unwrap();
        for _ in 0..3 {
            repo.record(EventType::View, EventTarget::Article(2)).await.unwrap();
        }
        repo.record(EventType::View, EventTarget::Video(1)).await.unwrap();

        let top = repo.top_articles(EventType::View, 5).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].title, "Match report");
        assert_eq!(top[0].views, 3);
        assert_eq!(top[1].article_id, 1);
    }
}
