//! Video repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateVideoInput, UpdateVideoInput, Video, VideoType};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, input: &CreateVideoInput) -> Result<Video>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Video>>;

    /// Newest first
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Video>>;

    async fn count(&self) -> Result<i64>;

    async fn update(&self, id: i64, input: &UpdateVideoInput) -> Result<Option<Video>>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxVideoRepository {
    pool: DynDatabasePool,
}

impl SqlxVideoRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn VideoRepository> {
        Arc::new(Self::new(pool))
    }
}

#[derive(Debug, FromRow)]
struct VideoRow {
    id: i64,
    title: String,
    description: Option<String>,
    video_url: String,
    video_type: String,
    thumbnail_url: Option<String>,
    category_id: Option<i64>,
    state_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VideoRow> for Video {
    type Error = anyhow::Error;

    fn try_from(row: VideoRow) -> Result<Self> {
        let video_type = VideoType::from_str(&row.video_type)
            .with_context(|| format!("Unknown video type: {}", row.video_type))?;
        Ok(Video {
            id: row.id,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            video_type,
            thumbnail_url: row.thumbnail_url,
            category_id: row.category_id,
            state_id: row.state_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_VIDEO: &str = "SELECT id, title, description, video_url, video_type, thumbnail_url, \
     category_id, state_id, created_at, updated_at FROM videos";

#[async_trait]
impl VideoRepository for SqlxVideoRepository {
    async fn create(&self, input: &CreateVideoInput) -> Result<Video> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_video_sqlite(self.pool.sqlite()?, input).await?,
            DatabaseDriver::Mysql => create_video_mysql(self.pool.mysql()?, input).await?,
        };
        self.get_by_id(id)
            .await?
            .context("Video vanished after insert")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Video>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_video_by_id_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => get_video_by_id_mysql(self.pool.mysql()?, id).await?,
        };
        row.map(Video::try_from).transpose()
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Video>> {
        let rows = match self.pool.driver() {
            DatabaseDriver::Sqlite => list_videos_sqlite(self.pool.sqlite()?, offset, limit).await?,
            DatabaseDriver::Mysql => list_videos_mysql(self.pool.mysql()?, offset, limit).await?,
        };
        rows.into_iter().map(Video::try_from).collect()
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_videos_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => count_videos_mysql(self.pool.mysql()?).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdateVideoInput) -> Result<Option<Video>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let merged = Video {
            title: input.title.clone().unwrap_or(existing.title),
            description: super::merge_text(&input.description, existing.description),
            video_url: input.video_url.clone().unwrap_or(existing.video_url),
            video_type: input.video_type.unwrap_or(existing.video_type),
            thumbnail_url: super::merge_text(&input.thumbnail_url, existing.thumbnail_url),
            category_id: input.category_id.unwrap_or(existing.category_id),
            state_id: input.state_id.unwrap_or(existing.state_id),
            ..existing
        };

        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_video_sqlite(self.pool.sqlite()?, &merged).await?,
            DatabaseDriver::Mysql => update_video_mysql(self.pool.mysql()?, &merged).await?,
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_video_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => delete_video_mysql(self.pool.mysql()?, id).await?,
        };
        Ok(affected > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_video_sqlite(pool: &SqlitePool, input: &CreateVideoInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO videos (title, description, video_url, video_type, thumbnail_url,
            category_id, state_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.video_url)
    .bind(input.video_type.as_str())
    .bind(&input.thumbnail_url)
    .bind(input.category_id)
    .bind(input.state_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create video")?;
    Ok(result.last_insert_rowid())
}

async fn get_video_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<VideoRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_VIDEO);
    sqlx::query_as::<_, VideoRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get video by ID")
}

async fn list_videos_sqlite(pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<VideoRow>> {
    let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?", SELECT_VIDEO);
    sqlx::query_as::<_, VideoRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list videos")
}

async fn count_videos_sqlite(pool: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos")
        .fetch_one(pool)
        .await
        .context("Failed to count videos")
}

async fn update_video_sqlite(pool: &SqlitePool, video: &Video) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE videos SET title = ?, description = ?, video_url = ?, video_type = ?,
            thumbnail_url = ?, category_id = ?, state_id = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.video_url)
    .bind(video.video_type.as_str())
    .bind(&video.thumbnail_url)
    .bind(video.category_id)
    .bind(video.state_id)
    .bind(Utc::now())
    .bind(video.id)
    .execute(pool)
    .await
    .context("Failed to update video")?;
    Ok(())
}

async fn delete_video_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM videos WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete video")?;
    Ok(result.rows_affected())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_video_mysql(pool: &MySqlPool, input: &CreateVideoInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO videos (title, description, video_url, video_type, thumbnail_url,
            category_id, state_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.video_url)
    .bind(input.video_type.as_str())
    .bind(&input.thumbnail_url)
    .bind(input.category_id)
    .bind(input.state_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create video")?;
    Ok(result.last_insert_id() as i64)
}

async fn get_video_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<VideoRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_VIDEO);
    sqlx::query_as::<_, VideoRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get video by ID")
}

async fn list_videos_mysql(pool: &MySqlPool, offset: i64, limit: i64) -> Result<Vec<VideoRow>> {
    let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?", SELECT_VIDEO);
    sqlx::query_as::<_, VideoRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list videos")
}

async fn count_videos_mysql(pool: &MySqlPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos")
        .fetch_one(pool)
        .await
        .context("Failed to count videos")
}

async fn update_video_mysql(pool: &MySqlPool, video: &Video) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE videos SET title = ?, description = ?, video_url = ?, video_type = ?,
            thumbnail_url = ?, category_id = ?, state_id = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.video_url)
    .bind(video.video_type.as_str())
    .bind(&video.thumbnail_url)
    .bind(video.category_id)
    .bind(video.state_id)
    .bind(Utc::now())
    .bind(video.id)
    .execute(pool)
    .await
    .context("Failed to update video")?;
    Ok(())
}

async fn delete_video_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM videos WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete video")?;
    Ok(result.rows_affected())
}
