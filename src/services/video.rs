//! Video service
//!
//! Video CRUD with YouTube thumbnail derivation: when a YouTube video is
//! saved without a thumbnail, the `maxresdefault` still of the video is used.

use crate::db::repositories::{CategoryRepository, RegionRepository, VideoRepository};
use crate::models::{CreateVideoInput, ListParams, PagedResult, UpdateVideoInput, Video, VideoType};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// How many videos the public pages show by default
pub const LATEST_VIDEOS: i64 = 6;

static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)").expect("valid YouTube regex")
});

/// Extract the video id from a YouTube watch or short URL
pub fn youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Thumbnail URL for a YouTube video, if the id can be found
pub fn youtube_thumbnail(url: &str) -> Option<String> {
    youtube_id(url).map(|id| format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", id))
}

#[derive(Debug, thiserror::Error)]
pub enum VideoServiceError {
    #[error("Video not found: {0}")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct VideoService {
    repo: Arc<dyn VideoRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    region_repo: Arc<dyn RegionRepository>,
}

impl VideoService {
    pub fn new(
        repo: Arc<dyn VideoRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        region_repo: Arc<dyn RegionRepository>,
    ) -> Self {
        Self {
            repo,
            category_repo,
            region_repo,
        }
    }

    pub async fn create(&self, mut input: CreateVideoInput) -> Result<Video, VideoServiceError> {
        input.title = required(&input.title, "title")?;
        input.video_url = required(&input.video_url, "video URL")?;
        input.thumbnail_url = input
            .thumbnail_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| derived_thumbnail(input.video_type, &input.video_url));
        self.check_references(input.category_id, input.state_id).await?;

        let video = self.repo.create(&input).await.context("Failed to create video")?;
        tracing::info!(video_id = video.id, video_type = %video.video_type, "Video created");
        Ok(video)
    }

    pub async fn update(
        &self,
        id: i64,
        mut input: UpdateVideoInput,
    ) -> Result<Video, VideoServiceError> {
        if let Some(title) = input.title.take() {
            input.title = Some(required(&title, "title")?);
        }
        if let Some(url) = input.video_url.take() {
            input.video_url = Some(required(&url, "video URL")?);
        }
        let existing = self.get_by_id(id).await?;
        self.check_references(input.category_id.flatten(), input.state_id.flatten())
            .await?;

        // Re-derive when the thumbnail is left blank after the change
        let thumbnail_missing = match &input.thumbnail_url {
            Some(url) => url.trim().is_empty(),
            None => existing.thumbnail_url.is_none(),
        };
        if thumbnail_missing {
            let video_type = input.video_type.unwrap_or(existing.video_type);
            let url = input.video_url.as_deref().unwrap_or(&existing.video_url);
            if let Some(thumbnail) = derived_thumbnail(video_type, url) {
                input.thumbnail_url = Some(thumbnail);
            }
        }

        self.repo
            .update(id, &input)
            .await
            .context("Failed to update video")?
            .ok_or(VideoServiceError::NotFound(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), VideoServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete video")? {
            return Err(VideoServiceError::NotFound(id));
        }
        Ok(())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Video, VideoServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get video")?
            .ok_or(VideoServiceError::NotFound(id))
    }

    /// Newest first, paginated
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<Video>, VideoServiceError> {
        let items = self
            .repo
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list videos")?;
        let total = self.count().await?;
        Ok(PagedResult::new(items, total, params))
    }

    /// The newest `limit` videos
    pub async fn latest(&self, limit: i64) -> Result<Vec<Video>, VideoServiceError> {
        Ok(self
            .repo
            .list(0, limit)
            .await
            .context("Failed to list latest videos")?)
    }

    pub async fn count(&self) -> Result<i64, VideoServiceError> {
        Ok(self.repo.count().await.context("Failed to count videos")?)
    }

    async fn check_references(
        &self,
        category_id: Option<i64>,
        state_id: Option<i64>,
    ) -> Result<(), VideoServiceError> {
        if let Some(id) = category_id {
            if self
                .category_repo
                .get_by_id(id)
                .await
                .context("Failed to check category")?
                .is_none()
            {
                return Err(VideoServiceError::ValidationError(format!(
                    "Category {} does not exist",
                    id
                )));
            }
        }
        if let Some(id) = state_id {
            if self
                .region_repo
                .get_by_id(id)
                .await
                .context("Failed to check state")?
                .is_none()
            {
                return Err(VideoServiceError::ValidationError(format!(
                    "State {} does not exist",
                    id
                )));
            }
        }
        Ok(())
    }
}

fn required(value: &str, field: &str) -> Result<String, VideoServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VideoServiceError::ValidationError(format!(
            "Video {} cannot be empty",
            field
        )));
    }
    Ok(value.to_string())
}

fn derived_thumbnail(video_type: VideoType, url: &str) -> Option<String> {
    match video_type {
        VideoType::Youtube => youtube_thumbnail(url),
        VideoType::Facebook => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxRegionRepository, SqlxVideoRepository,
    };
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> VideoService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        VideoService::new(
            SqlxVideoRepository::boxed(pool.clone()),
            SqlxCategoryRepository::boxed(pool.clone()),
            SqlxRegionRepository::boxed(pool),
        )
    }

    #[test]
    fn test_youtube_id_extraction() {
        assert_eq!(youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(youtube_id("https://youtu.be/dQw4w9WgXcQ?t=42"), Some("dQw4w9WgXcQ"));
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?v=abc123&list=PL1"),
            Some("abc123")
        );
        assert_eq!(youtube_id("https://vimeo.com/12345"), None);
    }

    #[test]
    fn test_youtube_thumbnail() {
        assert_eq!(
            youtube_thumbnail("https://youtu.be/xyz").as_deref(),
            Some("https://img.youtube.com/vi/xyz/maxresdefault.jpg")
        );
    }

    #[tokio::test]
    async fn test_create_derives_youtube_thumbnail() {
        let service = setup_test_service().await;
        let video = service
            .create(CreateVideoInput::new("Budget speech", "https://www.youtube.com/watch?v=bud9et"))
            .await
            .unwrap();
        assert_eq!(
            video.thumbnail_url.as_deref(),
            Some("https://img.youtube.com/vi/bud9et/maxresdefault.jpg")
        );

        let facebook = service
            .create(
                CreateVideoInput::new("Town hall", "https://facebook.com/watch/?v=1")
                    .with_type(VideoType::Facebook),
            )
            .await
            .unwrap();
        assert_eq!(facebook.thumbnail_url, None);
    }

    #[tokio::test]
    async fn test_create_keeps_explicit_thumbnail() {
        let service = setup_test_service().await;
        let video = service
            .create(
                CreateVideoInput::new("Derby", "https://youtu.be/derby1")
                    .with_thumbnail("https://cdn.example.in/derby.jpg"),
            )
            .await
            .unwrap();
        assert_eq!(video.thumbnail_url.as_deref(), Some("https://cdn.example.in/derby.jpg"));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = setup_test_service().await;
        let result = service.create(CreateVideoInput::new(" ", "https://youtu.be/x")).await;
        assert!(matches!(result, Err(VideoServiceError::ValidationError(_))));

        let result = service.create(CreateVideoInput::new("Title", "")).await;
        assert!(matches!(result, Err(VideoServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_new_url_rederives_blank_thumbnail() {
        let service = setup_test_service().await;
        let video = service
            .create(CreateVideoInput::new("Clip", "https://youtu.be/first"))
            .await
            .unwrap();

        let updated = service
            .update(
                video.id,
                UpdateVideoInput {
                    video_url: Some("https://youtu.be/second".to_string()),
                    thumbnail_url: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            updated.thumbnail_url.as_deref(),
            Some("https://img.youtube.com/vi/second/maxresdefault.jpg")
        );
    }

    #[tokio::test]
    async fn test_latest_and_delete() {
        let service = setup_test_service().await;
        for i in 0..8 {
            service
                .create(CreateVideoInput::new(format!("Clip {}", i), "https://youtu.be/c"))
                .await
                .unwrap();
        }
        let latest = service.latest(LATEST_VIDEOS).await.unwrap();
        assert_eq!(latest.len(), 6);
        assert_eq!(latest[0].title, "Clip 7");

        service.delete(latest[0].id).await.unwrap();
        assert!(matches!(
            service.get_by_id(latest[0].id).await,
            Err(VideoServiceError::NotFound(_))
        ));
        assert_eq!(service.count().await.unwrap(), 7);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn short_and_long_urls_agree(id in "[A-Za-z0-9_-]{6,15}") {
            let long = format!("https://www.youtube.com/watch?v={}&t=10", id);
            let short = format!("https://youtu.be/{}?si=share", id);
            prop_assert_eq!(youtube_id(&long), Some(id.as_str()));
            prop_assert_eq!(youtube_id(&short), Some(id.as_str()));
        }
    }
}
