//! Analytics service
//!
//! Records view events and builds the reports shown on the analytics and
//! admin dashboards.

use crate::db::repositories::{
    AnalyticsRepository, ArticleRepository, LiveStreamRepository, NewsletterRepository,
    VideoRepository,
};
use crate::models::{
    AnalyticsSummary, ArticleFilter, DailyViews, DashboardStats, EventTarget, EventType,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, Utc};
use std::sync::Arc;

/// Weekday labels in bucket order
pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Number of articles in the top list
pub const TOP_ARTICLES: i64 = 5;

/// Count timestamps per weekday, Sunday first
pub fn bucket_by_weekday(timestamps: &[DateTime<Utc>]) -> Vec<DailyViews> {
    let mut counts = [0i64; 7];
    for ts in timestamps {
        counts[ts.weekday().num_days_from_sunday() as usize] += 1;
    }
    WEEKDAYS
        .iter()
        .zip(counts)
        .map(|(day, views)| DailyViews {
            day: day.to_string(),
            views,
        })
        .collect()
}

pub struct AnalyticsService {
    repo: Arc<dyn AnalyticsRepository>,
    article_repo: Arc<dyn ArticleRepository>,
    video_repo: Arc<dyn VideoRepository>,
    live_stream_repo: Arc<dyn LiveStreamRepository>,
    newsletter_repo: Arc<dyn NewsletterRepository>,
}

impl AnalyticsService {
    pub fn new(
        repo: Arc<dyn AnalyticsRepository>,
        article_repo: Arc<dyn ArticleRepository>,
        video_repo: Arc<dyn VideoRepository>,
        live_stream_repo: Arc<dyn LiveStreamRepository>,
        newsletter_repo: Arc<dyn NewsletterRepository>,
    ) -> Self {
        Self {
            repo,
            article_repo,
            video_repo,
            live_stream_repo,
            newsletter_repo,
        }
    }

    pub async fn record_view(&self, target: EventTarget) -> Result<()> {
        self.repo
            .record(EventType::View, target)
            .await
            .context("Failed to record view")?;
        tracing::debug!(?target, "View recorded");
        Ok(())
    }

    pub async fn summary(&self) -> Result<AnalyticsSummary> {
        let now = Utc::now();
        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .context("Invalid start of day")?
            .and_utc();

        let total_views = self.repo.count(EventType::View).await?;
        let today_views = self.repo.count_since(EventType::View, start_of_day).await?;
        let recent = self
            .repo
            .timestamps_since(EventType::View, now - Duration::days(7))
            .await?;
        let top_articles = self.repo.top_articles(EventType::View, TOP_ARTICLES).await?;

        Ok(AnalyticsSummary {
            total_views,
            today_views,
            weekly_views: bucket_by_weekday(&recent),
            top_articles,
        })
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let all = ArticleFilter::default();
        let published = ArticleFilter::published();
        let (total_articles, published_articles, total_videos) = tokio::try_join!(
            self.article_repo.count(&all),
            self.article_repo.count(&published),
            self.video_repo.count(),
        )?;
        let (active_live_streams, active_subscribers, total_views) = tokio::try_join!(
            self.live_stream_repo.count_active(),
            self.newsletter_repo.count(Some(true)),
            self.repo.count(EventType::View),
        )?;

        Ok(DashboardStats {
            total_articles,
            published_articles,
            total_videos,
            active_live_streams,
            active_subscribers,
            total_views,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxAnalyticsRepository, SqlxArticleRepository, SqlxLiveStreamRepository,
        SqlxNewsletterRepository, SqlxVideoRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{ArticleStatus, CreateArticleInput, CreateVideoInput};
    use chrono::TimeZone;

    async fn setup() -> (AnalyticsService, DynDatabasePool) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool.execute(
            "INSERT INTO users (username, email, password_hash) VALUES ('desk', 'desk@example.in', 'x')",
        )
        .await
        .unwrap();
        let service = AnalyticsService::new(
            SqlxAnalyticsRepository::boxed(pool.clone()),
            SqlxArticleRepository::boxed(pool.clone()),
            SqlxVideoRepository::boxed(pool.clone()),
            SqlxLiveStreamRepository::boxed(pool.clone()),
            SqlxNewsletterRepository::boxed(pool.clone()),
        );
        (service, pool)
    }

    async fn article(service: &AnalyticsService, slug: &str, status: ArticleStatus) -> i64 {
        service
            .article_repo
            .create(&CreateArticleInput::new(slug, slug, "Body", 1).with_status(status))
            .await
            .unwrap()
            .id
    }

    async fn video(service: &AnalyticsService, title: &str) -> i64 {
        service
            .video_repo
            .create(&CreateVideoInput::new(title, "https://youtu.be/abc123"))
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_bucket_by_weekday() {
        // 2024-06-02 was a Sunday
        let sunday = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();
        let timestamps = vec![
            sunday,
            sunday + Duration::hours(3),
            sunday + Duration::days(3),
            sunday + Duration::days(6),
        ];
        let buckets = bucket_by_weekday(&timestamps);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0], DailyViews { day: "Sun".to_string(), views: 2 });
        assert_eq!(buckets[3].day, "Wed");
        assert_eq!(buckets[3].views, 1);
        assert_eq!(buckets[6].views, 1);
        assert_eq!(buckets[1].views, 0);
    }

    #[tokio::test]
    async fn test_summary_counts_views() {
        let (service, _pool) = setup().await;
        let popular = article(&service, "popular", ArticleStatus::Published).await;
        let quiet = article(&service, "quiet", ArticleStatus::Published).await;
        let clip = video(&service, "Flood footage").await;

        for _ in 0..3 {
            service.record_view(EventTarget::Article(popular)).await.unwrap();
        }
        service.record_view(EventTarget::Article(quiet)).await.unwrap();
        service.record_view(EventTarget::Video(clip)).await.unwrap();

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.total_views, 5);
        assert_eq!(summary.today_views, 5);
        assert_eq!(summary.weekly_views.iter().map(|d| d.views).sum::<i64>(), 5);
        assert_eq!(summary.top_articles.len(), 2);
        assert_eq!(summary.top_articles[0].article_id, popular);
        assert_eq!(summary.top_articles[0].views, 3);
        assert_eq!(summary.top_articles[1].title, "quiet");
    }

    #[tokio::test]
    async fn test_summary_ignores_old_views_for_week() {
        let (service, pool) = setup().await;
        let id = article(&service, "archive", ArticleStatus::Published).await;
        service.record_view(EventTarget::Article(id)).await.unwrap();

        let old = Utc::now() - Duration::days(30);
        sqlx::query("INSERT INTO analytics (event_type, article_id, created_at) VALUES ('view', ?, ?)")
            .bind(id)
            .bind(old)
            .execute(pool.as_sqlite().unwrap())
            .await
            .unwrap();

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.total_views, 2);
        assert_eq!(summary.today_views, 1);
        assert_eq!(summary.weekly_views.iter().map(|d| d.views).sum::<i64>(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let (service, pool) = setup().await;
        article(&service, "one", ArticleStatus::Published).await;
        article(&service, "two", ArticleStatus::Draft).await;
        pool.execute("INSERT INTO newsletter_subscriptions (email, is_active) VALUES ('a@x.in', 1)")
            .await
            .unwrap();
        let clip = video(&service, "Rally").await;
        service.record_view(EventTarget::Video(clip)).await.unwrap();

        let stats = service.dashboard_stats().await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_articles: 2,
                published_articles: 1,
                total_videos: 1,
                active_live_streams: 0,
                active_subscribers: 1,
                total_views: 1,
            }
        );
    }
}
