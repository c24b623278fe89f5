//! Newsdesk - A regional news publishing system
//!
//! This library provides the core of the newsdesk CMS: articles with
//! breaking and featured flags, videos, live streams, newsletter signups,
//! view analytics and the public front page, served as a JSON API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

use std::sync::Arc;

use api::AppState;
use config::Config;
use db::{
    repositories::{
        SqlxAnalyticsRepository, SqlxArticleRepository, SqlxCategoryRepository,
        SqlxLiveStreamRepository, SqlxNewsletterRepository, SqlxRegionRepository,
        SqlxSessionRepository, SqlxUserRepository, SqlxVideoRepository,
    },
    DynDatabasePool,
};
use services::{
    AnalyticsService, ArticleService, CategoryService, HomeService, I18nService,
    LiveStreamService, LoginRateLimiter, NewsletterService, RegionService, UserService,
    VideoService,
};

/// Wire repositories and services over a migrated pool
pub fn build_state(pool: DynDatabasePool, config: &Config) -> AppState {
    // Repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let region_repo = SqlxRegionRepository::boxed(pool.clone());
    let article_repo = SqlxArticleRepository::boxed(pool.clone());
    let video_repo = SqlxVideoRepository::boxed(pool.clone());
    let live_stream_repo = SqlxLiveStreamRepository::boxed(pool.clone());
    let newsletter_repo = SqlxNewsletterRepository::boxed(pool.clone());
    let analytics_repo = SqlxAnalyticsRepository::boxed(pool.clone());

    // Services
    let user_service = Arc::new(UserService::new(
        user_repo,
        session_repo,
        config.auth.session_days,
    ));
    let category_service = Arc::new(CategoryService::new(category_repo.clone()));
    let region_service = Arc::new(RegionService::new(region_repo.clone()));
    let article_service = Arc::new(ArticleService::new(
        article_repo.clone(),
        category_repo.clone(),
        region_repo.clone(),
    ));
    let video_service = Arc::new(VideoService::new(
        video_repo.clone(),
        category_repo,
        region_repo,
    ));
    let live_stream_service = Arc::new(LiveStreamService::new(live_stream_repo.clone()));
    let newsletter_service = Arc::new(NewsletterService::new(newsletter_repo.clone()));
    let analytics_service = Arc::new(AnalyticsService::new(
        analytics_repo,
        article_repo,
        video_repo,
        live_stream_repo,
        newsletter_repo,
    ));
    let home_service = Arc::new(HomeService::new(
        article_service.clone(),
        category_service.clone(),
        video_service.clone(),
        live_stream_service.clone(),
    ));

    AppState {
        pool,
        user_service,
        article_service,
        category_service,
        region_service,
        video_service,
        live_stream_service,
        newsletter_service,
        analytics_service,
        home_service,
        i18n: Arc::new(I18nService::new(config.site.default_language.clone())),
        rate_limiter: Arc::new(LoginRateLimiter::new(&config.auth)),
        trust_proxy: config.server.trust_proxy,
    }
}
