//! Category repository
//!
//! News sections used to file articles and videos.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name
    async fn list(&self) -> Result<Vec<Category>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    async fn create(&self, input: &CreateCategoryInput) -> Result<Category>;

    /// Apply a partial update; `None` when the category does not exist
    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Option<Category>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Whether another category already uses this name or slug
    async fn name_or_slug_taken(&self, name: &str, slug: &str, exclude_id: Option<i64>)
        -> Result<bool>;
}

pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_CATEGORY: &str =
    "SELECT id, name, slug, description, created_at, updated_at FROM categories";

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>> {
        let rows = match self.pool.driver() {
            DatabaseDriver::Sqlite => list_categories_sqlite(self.pool.sqlite()?).await?,
            DatabaseDriver::Mysql => list_categories_mysql(self.pool.mysql()?).await?,
        };
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_category_by_id_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => get_category_by_id_mysql(self.pool.mysql()?, id).await?,
        };
        Ok(row.map(Category::from))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_category_by_slug_sqlite(self.pool.sqlite()?, slug).await?,
            DatabaseDriver::Mysql => get_category_by_slug_mysql(self.pool.mysql()?, slug).await?,
        };
        Ok(row.map(Category::from))
    }

    async fn create(&self, input: &CreateCategoryInput) -> Result<Category> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_category_sqlite(self.pool.sqlite()?, input).await?,
            DatabaseDriver::Mysql => create_category_mysql(self.pool.mysql()?, input).await?,
        };
        self.get_by_id(id)
            .await?
            .context("Category vanished after insert")
    }

    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Option<Category>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let name = input.name.clone().unwrap_or(existing.name);
        let slug = input.slug.clone().unwrap_or(existing.slug);
        let description = super::merge_text(&input.description, existing.description);

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_category_sqlite(self.pool.sqlite()?, id, &name, &slug, &description).await?
            }
            DatabaseDriver::Mysql => {
                update_category_mysql(self.pool.mysql()?, id, &name, &slug, &description).await?
            }
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_category_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => delete_category_mysql(self.pool.mysql()?, id).await?,
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

async fn list_categories_sqlite(pool: &SqlitePool) -> Result<Vec<CategoryRow>> {
    let sql = format!("{} ORDER BY name ASC", SELECT_CATEGORY);
    sqlx::query_as::<_, CategoryRow>(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list categories")
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<CategoryRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_CATEGORY);
    sqlx::query_as::<_, CategoryRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")
}

async fn get_category_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<CategoryRow>> {
    let sql = format!("{} WHERE slug = ?", SELECT_CATEGORY);
    sqlx::query_as::<_, CategoryRow>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")
}

async fn create_category_sqlite(pool: &SqlitePool, input: &CreateCategoryInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO categories (name, slug, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&input.name)
    .bind(&input.slug)
    .bind(&input.description)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;
    Ok(result.last_insert_rowid())
}

async fn update_category_sqlite(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    slug: &str,
    description: &Option<String>,
) -> Result<()> {
    sqlx::query(
        "UPDATE categories SET name = ?, slug = ?, description = ?, updated_at = ? WHERE id = ?",
    )
    .bind(name)
    .bind(slug)
    .bind(description)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update category")?;
    Ok(())
}

async fn delete_category_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;
    Ok(result.rows_affected())
}

async fn count_conflicts_sqlite(pool: &SqlitePool, name: &str, slug: &str, exclude: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM categories WHERE (LOWER(name) = LOWER(?) OR slug = ?) AND id != ?",
    )
    .bind(name)
    .bind(slug)
    .bind(exclude)
    .fetch_one(pool)
    .await
    .context("Failed to check category uniqueness")
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_categories_mysql(pool: &MySqlPool) -> Result<Vec<CategoryRow>> {
    let sql = format!("{} ORDER BY name ASC", SELECT_CATEGORY);
    sqlx::query_as::<_, CategoryRow>(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list categories")
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<CategoryRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_CATEGORY);
    sqlx::query_as::<_, CategoryRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")
}

async fn get_category_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<CategoryRow>> {
    let sql = format!("{} WHERE slug = ?", SELECT_CATEGORY);
    sqlx::query_as::<_, CategoryRow>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")
}

async fn create_category_mysql(pool: &MySqlPool, input: &CreateCategoryInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO categories (name, slug, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&input.name)
    .bind(&input.slug)
    .bind(&input.description)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;
    Ok(result.last_insert_id() as i64)
}

async fn update_category_mysql(
    pool: &MySqlPool,
    id: i64,
    name: &str,
    slug: &str,
    description: &Option<String>,
) -> Result<()> {
    sqlx::query(
        "UPDATE categories SET name = ?, slug = ?, description = ?, updated_at = ? WHERE id = ?",
    )
    .bind(name)
    .bind(slug)
    .bind(description)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update category")?;
    Ok(())
}

async fn delete_category_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;
    Ok(result.rows_affected())
}

async fn count_conflicts_mysql(pool: &MySqlPool, name: &str, slug: &str, exclude: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM categories WHERE (LOWER(name) = LOWER(?) OR slug = ?) AND id != ?",
    )
    .bind(name)
    .bind(slug)
    .bind(exclude)
    .fetch_one(pool)
    .await
    .context("Failed to check category uniqueness")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxCategoryRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxCategoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let repo = setup().await;
        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"Politics".to_string()));
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let repo = setup().await;
        let created = repo
            .create(&CreateCategoryInput::new("Education", "education"))
            .await
            .unwrap();
        assert_eq!(created.slug, "education");

        let updated = repo
            .update(
                created.id,
                &UpdateCategoryInput {
                    description: Some("Schools and exams".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Education");
        assert_eq!(updated.description.as_deref(), Some("Schools and exams"));

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.update(created.id, &UpdateCategoryInput::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_name_or_slug_taken() {
        let repo = setup().await;
        let sports = repo.get_by_slug("sports").await.unwrap().unwrap();

        assert!(repo.name_or_slug_taken("SPORTS", "x", None).await.unwrap());
        assert!(repo.name_or_slug_taken("x", "sports", None).await.unwrap());
        assert!(!repo.name_or_slug_taken("Sports", "sports", Some(sports.id)).await.unwrap());
        assert!(!repo.name_or_slug_taken("Travel", "travel", None).await.unwrap());
    }
}
