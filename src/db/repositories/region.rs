//! Region repository
//!
//! Rows of the `states` table, used for regional filing.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateCategoryInput, Region, UpdateCategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait RegionRepository: Send + Sync {
    /// All states ordered by name
    async fn list(&self) -> Result<Vec<Region>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Region>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Region>>;

    /// The description of the input is ignored; states only carry a name
    async fn create(&self, input: &CreateCategoryInput) -> Result<Region>;

    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Option<Region>>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn name_or_slug_taken(&self, name: &str, slug: &str, exclude_id: Option<i64>)
        -> Result<bool>;
}

pub struct SqlxRegionRepository {
    pool: DynDatabasePool,
}

impl SqlxRegionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RegionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[derive(Debug, FromRow)]
struct RegionRow {
    id: i64,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RegionRow> for Region {
    fn from(row: RegionRow) -> Self {
        Region {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_REGION: &str = "SELECT id, name, slug, created_at, updated_at FROM states";

#[async_trait]
impl RegionRepository for SqlxRegionRepository {
    async fn list(&self) -> Result<Vec<Region>> {
        let rows = match self.pool.driver() {
            DatabaseDriver::Sqlite => list_regions_sqlite(self.pool.sqlite()?).await?,
            DatabaseDriver::Mysql => list_regions_mysql(self.pool.mysql()?).await?,
        };
        Ok(rows.into_iter().map(Region::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Region>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_region_by_id_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => get_region_by_id_mysql(self.pool.mysql()?, id).await?,
        };
        Ok(row.map(Region::from))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Region>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_region_by_slug_sqlite(self.pool.sqlite()?, slug).await?,
            DatabaseDriver::Mysql => get_region_by_slug_mysql(self.pool.mysql()?, slug).await?,
        };
        Ok(row.map(Region::from))
    }

    async fn create(&self, input: &CreateCategoryInput) -> Result<Region> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_region_sqlite(self.pool.sqlite()?, input).await?,
            DatabaseDriver::Mysql => create_region_mysql(self.pool.mysql()?, input).await?,
        };
        self.get_by_id(id)
            .await?
            .context("State vanished after insert")
    }

    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Option<Region>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let name = input.name.clone().unwrap_or(existing.name);
        let slug = input.slug.clone().unwrap_or(existing.slug);

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_region_sqlite(self.pool.sqlite()?, id, &name, &slug).await?
            }
            DatabaseDriver::Mysql => update_region_mysql(self.pool.mysql()?, id, &name, &slug).await?,
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_region_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => delete_region_mysql(self.pool.mysql()?, id).await?,
        };
        Ok(affected > 0)
    }

    async fn name_or_slug_taken(
        &self,
        name: &str,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let exclude = exclude_id.unwrap_or(0);
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_conflicts_sqlite(self.pool.sqlite()?, name, slug, exclude).await?
            }
            DatabaseDriver::Mysql => {
                count_conflicts_mysql(self.pool.mysql()?, name, slug, exclude).await?
            }
        };
        Ok(count > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_regions_sqlite(pool: &SqlitePool) -> Result<Vec<RegionRow>> {
    let sql = format!("{} ORDER BY name ASC", SELECT_REGION);
    sqlx::query_as::<_, RegionRow>(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list states")
}

async fn get_region_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<RegionRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_REGION);
    sqlx::query_as::<_, RegionRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get state by ID")
}

async fn get_region_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<RegionRow>> {
    let sql = format!("{} WHERE slug = ?", SELECT_REGION);
    sqlx::query_as::<_, RegionRow>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get state by slug")
}

async fn create_region_sqlite(pool: &SqlitePool, input: &CreateCategoryInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query("INSERT INTO states (name, slug, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(&input.name)
        .bind(&input.slug)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create state")?;
    Ok(result.last_insert_rowid())
}

async fn update_region_sqlite(pool: &SqlitePool, id: i64, name: &str, slug: &str) -> Result<()> {
    sqlx::query("UPDATE states SET name = ?, slug = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(slug)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update state")?;
    Ok(())
}

async fn delete_region_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM states WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete state")?;
    Ok(result.rows_affected())
}

async fn count_conflicts_sqlite(pool: &SqlitePool, name: &str, slug: &str, exclude: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM states WHERE (LOWER(name) = LOWER(?) OR slug = ?) AND id != ?",
    )
    .bind(name)
    .bind(slug)
    .bind(exclude)
    .fetch_one(pool)
    .await
    .context("Failed to check state uniqueness")
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_regions_mysql(pool: &MySqlPool) -> Result<Vec<RegionRow>> {
    let sql = format!("{} ORDER BY name ASC", SELECT_REGION);
    sqlx::query_as::<_, RegionRow>(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list states")
}

async fn get_region_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<RegionRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_REGION);
    sqlx::query_as::<_, RegionRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get state by ID")
}

async fn get_region_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<RegionRow>> {
    let sql = format!("{} WHERE slug = ?", SELECT_REGION);
    sqlx::query_as::<_, RegionRow>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get state by slug")
}

async fn create_region_mysql(pool: &MySqlPool, input: &CreateCategoryInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query("INSERT INTO states (name, slug, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(&input.name)
        .bind(&input.slug)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create state")?;
    Ok(result.last_insert_id() as i64)
}

async fn update_region_mysql(pool: &MySqlPool, id: i64, name: &str, slug: &str) -> Result<()> {
    sqlx::query("UPDATE states SET name = ?, slug = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(slug)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update state")?;
    Ok(())
}

async fn delete_region_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM states WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete state")?;
    Ok(result.rows_affected())
}

async fn count_conflicts_mysql(pool: &MySqlPool, name: &str, slug: &str, exclude: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM states WHERE (LOWER(name) = LOWER(?) OR slug = ?) AND id != ?",
    )
    .bind(name)
    .bind(slug)
    .bind(exclude)
    .fetch_one(pool)
    .await
    .context("Failed to check state uniqueness")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxRegionRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxRegionRepository::new(pool)
    }

    #[tokio::test]
    async fn test_seeded_states() {
        let repo = setup().await;
        let states = repo.list().await.unwrap();
        assert_eq!(states.len(), 6);
        assert_eq!(states[0].name, "Gujarat");

        let tn = repo.get_by_slug("tamil-nadu").await.unwrap().unwrap();
        assert_eq!(tn.name, "Tamil Nadu");
    }

    #[tokio::test]
    async fn test_create_rename_delete() {
        let repo = setup().await;
        let kerala = repo
            .create(&CreateCategoryInput::new("Kerala", "kerala"))
            .await
            .unwrap();

        let renamed = repo
            .update(
                kerala.id,
                &UpdateCategoryInput {
                    name: Some("Keralam".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Keralam");
        assert_eq!(renamed.slug, "kerala");

        assert!(repo.name_or_slug_taken("keralam", "other", None).await.unwrap());
        assert!(repo.delete(kerala.id).await.unwrap());
        assert!(repo.get_by_id(kerala.id).await.unwrap().is_none());
    }
}
