//! Live stream repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateLiveStreamInput, LiveStream, UpdateLiveStreamInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait LiveStreamRepository: Send + Sync {
    async fn create(&self, input: &CreateLiveStreamInput) -> Result<LiveStream>;

    async fn get_by_id(&self, id: i64) -> Result<Option<LiveStream>>;

    /// All streams, newest first; `active_only` keeps the ones on air
    async fn list(&self, active_only: bool) -> Result<Vec<LiveStream>>;

    async fn count_active(&self) -> Result<i64>;

    async fn update(&self, id: i64, input: &UpdateLiveStreamInput) -> Result<Option<LiveStream>>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct SqlxLiveStreamRepository {
    pool: DynDatabasePool,
}

impl SqlxLiveStreamRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LiveStreamRepository> {
        Arc::new(Self::new(pool))
    }
}

#[derive(Debug, FromRow)]
struct LiveStreamRow {
    id: i64,
    title: String,
    description: Option<String>,
    stream_url: String,
    thumbnail_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LiveStreamRow> for LiveStream {
    fn from(row: LiveStreamRow) -> Self {
        LiveStream {
            id: row.id,
            title: row.title,
            description: row.description,
            stream_url: row.stream_url,
            thumbnail_url: row.thumbnail_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_STREAM: &str = "SELECT id, title, description, stream_url, thumbnail_url, is_active, \
     created_at, updated_at FROM live_streams";

#[async_trait]
impl LiveStreamRepository for SqlxLiveStreamRepository {
    async fn create(&self, input: &CreateLiveStreamInput) -> Result<LiveStream> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_stream_sqlite(self.pool.sqlite()?, input).await?,
            DatabaseDriver::Mysql => create_stream_mysql(self.pool.mysql()?, input).await?,
        };
        self.get_by_id(id)
            .await?
            .context("Live stream vanished after insert")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<LiveStream>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_stream_by_id_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => get_stream_by_id_mysql(self.pool.mysql()?, id).await?,
        };
        Ok(row.map(LiveStream::from))
    }

    async fn list(&self, active_only: bool) -> Result<Vec<LiveStream>> {
        let rows = match self.pool.driver() {
            DatabaseDriver::Sqlite => list_streams_sqlite(self.pool.sqlite()?, active_only).await?,
            DatabaseDriver::Mysql => list_streams_mysql(self.pool.mysql()?, active_only).await?,
        };
        Ok(rows.into_iter().map(LiveStream::from).collect())
    }

    async fn count_active(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_active_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => count_active_mysql(self.pool.mysql()?).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdateLiveStreamInput) -> Result<Option<LiveStream>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let merged = LiveStream {
            title: input.title.clone().unwrap_or(existing.title),
            description: super::merge_text(&input.description, existing.description),
            stream_url: input.stream_url.clone().unwrap_or(existing.stream_url),
            thumbnail_url: super::merge_text(&input.thumbnail_url, existing.thumbnail_url),
            is_active: input.is_active.unwrap_or(existing.is_active),
            ..existing
        };

        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_stream_sqlite(self.pool.sqlite()?, &merged).await?,
            DatabaseDriver::Mysql => update_stream_mysql(self.pool.mysql()?, &merged).await?,
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_stream_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => delete_stream_mysql(self.pool.mysql()?, id).await?,
        };
        Ok(affected > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_stream_sqlite(pool: &SqlitePool, input: &CreateLiveStreamInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO live_streams (title, description, stream_url, thumbnail_url, is_active,
            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.stream_url)
    .bind(&input.thumbnail_url)
    .bind(input.is_active)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create live stream")?;
    Ok(result.last_insert_rowid())
}

async fn get_stream_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<LiveStreamRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_STREAM);
    sqlx::query_as::<_, LiveStreamRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get live stream by ID")
}

async fn list_streams_sqlite(pool: &SqlitePool, active_only: bool) -> Result<Vec<LiveStreamRow>> {
    let sql = if active_only {
        format!("{} WHERE is_active = ? ORDER BY created_at DESC, id DESC", SELECT_STREAM)
    } else {
        format!("{} ORDER BY created_at DESC, id DESC", SELECT_STREAM)
    };
    let mut query = sqlx::query_as::<_, LiveStreamRow>(&sql);
    if active_only {
        query = query.bind(true);
    }
    query
        .fetch_all(pool)
        .await
        .context("Failed to list live streams")
}

async fn count_active_sqlite(pool: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM live_streams WHERE is_active = ?")
        .bind(true)
        .fetch_one(pool)
        .await
        .context("Failed to count active live streams")
}

async fn update_stream_sqlite(pool: &SqlitePool, stream: &LiveStream) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE live_streams SET title = ?, description = ?, stream_url = ?, thumbnail_url = ?,
            is_active = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&stream.title)
    .bind(&stream.description)
    .bind(&stream.stream_url)
    .bind(&stream.thumbnail_url)
    .bind(stream.is_active)
    .bind(Utc::now())
    .bind(stream.id)
    .execute(pool)
    .await
    .context("Failed to update live stream")?;
    Ok(())
}

async fn delete_stream_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM live_streams WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete live stream")?;
    Ok(result.rows_affected())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_stream_mysql(pool: &MySqlPool, input: &CreateLiveStreamInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO live_streams (title, description, stream_url, thumbnail_url, is_active,
            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.stream_url)
    .bind(&input.thumbnail_url)
    .bind(input.is_active)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create live stream")?;
    Ok(result.last_insert_id() as i64)
}

async fn get_stream_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<LiveStreamRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_STREAM);
    sqlx::query_as::<_, LiveStreamRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get live stream by ID")
}

async fn list_streams_mysql(pool: &MySqlPool, active_only: bool) -> Result<Vec<LiveStreamRow>> {
    let sql = if active_only {
        format!("{} WHERE is_active = ? ORDER BY created_at DESC, id DESC", SELECT_STREAM)
    } else {
        format!("{} ORDER BY created_at DESC, id DESC", SELECT_STREAM)
    };
    let mut query = sqlx::query_as::<_, LiveStreamRow>(&sql);
    if active_only {
        query = query.bind(true);
    }
    query
        .fetch_all(pool)
        .await
        .context("Failed to list live streams")
}

async fn count_active_mysql(pool: &MySqlPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM live_streams WHERE is_active = ?")
        .bind(true)
        .fetch_one(pool)
        .await
        .context("Failed to count active live streams")
}

async fn update_stream_mysql(pool: &MySqlPool, stream: &LiveStream) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE live_streams SET title = ?, description = ?, stream_url = ?, thumbnail_url = ?,
            is_active = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&stream.title)
    .bind(&stream.description)
    .bind(&stream.stream_url)
    .bind(&stream.thumbnail_url)
    .bind(stream.is_active)
    .bind(Utc::now())
    .bind(stream.id)
    .execute(pool)
    .await
    .context("Failed to update live stream")?;
    Ok(())
}

async fn delete_stream_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM live_streams WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete live stream")?;
    Ok(result.rows_affected())
}
