//! Home page service
//!
//! Assembles everything the public front page shows in one read.

use super::article::ArticleService;
use super::category::CategoryService;
use super::live_stream::LiveStreamService;
use super::video::{VideoService, LATEST_VIDEOS};
use crate::models::{Article, ArticleFilter, Category, LiveStream, Video};
use anyhow::Result;
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;

/// Featured articles: one main story plus the side column
pub const FEATURED_LIMIT: i64 = 5;
pub const LATEST_LIMIT: i64 = 8;
pub const SECTION_LIMIT: i64 = 3;
pub const NAV_CATEGORIES: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct FeaturedArticles {
    pub main: Option<Article>,
    pub side: Vec<Article>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySection {
    pub category: Category,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub breaking: Vec<Article>,
    pub featured: FeaturedArticles,
    pub latest: Vec<Article>,
    pub sections: Vec<CategorySection>,
    pub videos: Vec<Video>,
    pub live_streams: Vec<LiveStream>,
    pub nav_categories: Vec<Category>,
}

pub struct HomeService {
    articles: Arc<ArticleService>,
    categories: Arc<CategoryService>,
    videos: Arc<VideoService>,
    live_streams: Arc<LiveStreamService>,
}

impl HomeService {
    pub fn new(
        articles: Arc<ArticleService>,
        categories: Arc<CategoryService>,
        videos: Arc<VideoService>,
        live_streams: Arc<LiveStreamService>,
    ) -> Self {
        Self {
            articles,
            categories,
            videos,
            live_streams,
        }
    }

    pub async fn home_page(&self) -> Result<HomePage> {
        let categories = self.categories.list().await?;

        let breaking = self.articles.breaking_ticker().await?;
        let featured = self
            .articles
            .latest(ArticleFilter::default().featured(), FEATURED_LIMIT)
            .await?;
        let latest = self
            .articles
            .latest(ArticleFilter::default(), LATEST_LIMIT)
            .await?;
        let sections = self.sections(&categories).await?;
        let videos = self.videos.latest(LATEST_VIDEOS).await?;
        let live_streams = self.live_streams.list_active().await?;

        Ok(HomePage {
            breaking,
            featured: split_featured(featured),
            latest,
            sections,
            videos,
            live_streams,
            nav_categories: categories.into_iter().take(NAV_CATEGORIES).collect(),
        })
    }

    async fn sections(&self, categories: &[Category]) -> Result<Vec<CategorySection>> {
        let lookups = categories.iter().map(|category| async move {
            let articles = self
                .articles
                .latest(ArticleFilter::default().in_category(category.id), SECTION_LIMIT)
                .await?;
            Ok::<_, anyhow::Error>(CategorySection {
                category: category.clone(),
                articles,
            })
        });

        let sections = try_join_all(lookups).await?;
        Ok(sections
            .into_iter()
            .filter(|section| !section.articles.is_empty())
            .collect())
    }
}

fn split_featured(mut featured: Vec<Article>) -> FeaturedArticles {
    if featured.is_empty() {
        return FeaturedArticles {
            main: None,
            side: Vec::new(),
        };
    }
    let main = featured.remove(0);
    FeaturedArticles {
        main: Some(main),
        side: featured,
    }
}
