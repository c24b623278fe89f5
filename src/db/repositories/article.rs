//! Article repository
//!
//! Database operations for articles.
//!
//! - `ArticleRepository` defines article data access
//! - `SqlxArticleRepository` implements it for SQLite and MySQL
//!
//! Every read joins the category, state and author so list screens can show
//! names without extra round trips.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Article, ArticleFilter, ArticleStatus, CreateArticleInput, UpdateArticleInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, input: &CreateArticleInput) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Get article by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// List articles matching a filter.
    ///
    /// Published listings are ordered by `published_at`, everything else by
    /// `created_at`, newest first.
    async fn list(&self, filter: &ArticleFilter, offset: i64, limit: i64) -> Result<Vec<Article>>;

    /// Count articles matching a filter
    async fn count(&self, filter: &ArticleFilter) -> Result<i64>;

    /// Apply a partial update; `None` when the article does not exist
    async fn update(&self, id: i64, input: &UpdateArticleInput) -> Result<Option<Article>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check if a slug is used, optionally ignoring one article (for updates)
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[derive(Debug, FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    slug: String,
    summary: Option<String>,
    content: String,
    featured_image_url: Option<String>,
    status: String,
    is_breaking: bool,
    is_featured: bool,
    category_id: Option<i64>,
    state_id: Option<i64>,
    author_id: i64,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_keywords: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: Option<String>,
    state_name: Option<String>,
    author_name: Option<String>,
}

impl TryFrom<ArticleRow> for Article {
    type Error = anyhow::Error;

    fn try_from(row: ArticleRow) -> Result<Self> {
        let status = ArticleStatus::from_str(&row.status)
            .with_context(|| format!("Unknown article status: {}", row.status))?;
        Ok(Article {
            id: row.id,
            title: row.title,
            slug: row.slug,
            summary: row.summary,
            content: row.content,
            featured_image_url: row.featured_image_url,
            status,
            is_breaking: row.is_breaking,
            is_featured: row.is_featured,
            category_id: row.category_id,
            state_id: row.state_id,
            author_id: row.author_id,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            meta_keywords: row.meta_keywords,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category_name: row.category_name,
            state_name: row.state_name,
            author_name: row.author_name,
        })
    }
}

fn into_articles(rows: Vec<ArticleRow>) -> Result<Vec<Article>> {
    rows.into_iter().map(Article::try_from).collect()
}

const SELECT_ARTICLE: &str = r#"
    SELECT a.id, a.title, a.slug, a.summary, a.content, a.featured_image_url, a.status,
           a.is_breaking, a.is_featured, a.category_id, a.state_id, a.author_id,
           a.meta_title, a.meta_description, a.meta_keywords,
           a.published_at, a.created_at, a.updated_at,
           c.name AS category_name, s.name AS state_name,
           COALESCE(u.full_name, u.username) AS author_name
    FROM articles a
    LEFT JOIN categories c ON c.id = a.category_id
    LEFT JOIN states s ON s.id = a.state_id
    LEFT JOIN users u ON u.id = a.author_id
"#;

const COUNT_ARTICLE: &str = r#"
    SELECT COUNT(*)
    FROM articles a
    LEFT JOIN categories c ON c.id = a.category_id
    LEFT JOIN states s ON s.id = a.state_id
"#;

/// A value bound to a filter placeholder
#[derive(Debug, Clone, PartialEq)]
enum FilterValue {
    Int(i64),
    Text(String),
    Bool(bool),
}

/// Build the WHERE clause for a filter. Both drivers use `?` placeholders.
fn filter_clause(filter: &ArticleFilter) -> (String, Vec<FilterValue>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(status) = filter.status {
        conditions.push("a.status = ?");
        values.push(FilterValue::Text(status.as_str().to_string()));
    }
    if let Some(category_id) = filter.category_id {
        conditions.push("a.category_id = ?");
        values.push(FilterValue::Int(category_id));
    }
    if let Some(slug) = &filter.category_slug {
        conditions.push("c.slug = ?");
        values.push(FilterValue::Text(slug.clone()));
    }
    if let Some(state_id) = filter.state_id {
        conditions.push("a.state_id = ?");
        values.push(FilterValue::Int(state_id));
    }
    if let Some(slug) = &filter.state_slug {
        conditions.push("s.slug = ?");
        values.push(FilterValue::Text(slug.clone()));
    }
    if let Some(breaking) = filter.is_breaking {
        conditions.push("a.is_breaking = ?");
        values.push(FilterValue::Bool(breaking));
    }
    if let Some(featured) = filter.is_featured {
        conditions.push("a.is_featured = ?");
        values.push(FilterValue::Bool(featured));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        conditions.push("(a.title LIKE ? OR a.summary LIKE ?)");
        values.push(FilterValue::Text(pattern.clone()));
        values.push(FilterValue::Text(pattern));
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

fn order_clause(filter: &ArticleFilter) -> &'static str {
    if filter.status == Some(ArticleStatus::Published) {
        " ORDER BY a.published_at DESC, a.id DESC"
    } else {
        " ORDER BY a.created_at DESC, a.id DESC"
    }
}

/// Work out the stored `published_at` after a status change
fn resolve_published_at(
    status: ArticleStatus,
    current: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match status {
        ArticleStatus::Published => current.or_else(|| Some(Utc::now())),
        _ => None,
    }
}

/// Fully resolved column values for an UPDATE
struct ArticleValues {
    title: String,
    slug: String,
    summary: Option<String>,
    content: String,
    featured_image_url: Option<String>,
    status: ArticleStatus,
    is_breaking: bool,
    is_featured: bool,
    category_id: Option<i64>,
    state_id: Option<i64>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_keywords: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

impl ArticleValues {
    fn merge(existing: Article, input: &UpdateArticleInput) -> Self {
        let status = input.status.unwrap_or(existing.status);
        Self {
            title: input.title.clone().unwrap_or(existing.title),
            slug: input.slug.clone().unwrap_or(existing.slug),
            summary: super::merge_text(&input.summary, existing.summary),
            content: input.content.clone().unwrap_or(existing.content),
            featured_image_url: super::merge_text(
                &input.featured_image_url,
                existing.featured_image_url,
            ),
            status,
            is_breaking: input.is_breaking.unwrap_or(existing.is_breaking),
            is_featured: input.is_featured.unwrap_or(existing.is_featured),
            category_id: input.category_id.unwrap_or(existing.category_id),
            state_id: input.state_id.unwrap_or(existing.state_id),
            meta_title: super::merge_text(&input.meta_title, existing.meta_title),
            meta_description: super::merge_text(&input.meta_description, existing.meta_description),
            meta_keywords: super::merge_text(&input.meta_keywords, existing.meta_keywords),
            published_at: resolve_published_at(status, existing.published_at),
        }
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, input: &CreateArticleInput) -> Result<Article> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_article_sqlite(self.pool.sqlite()?, input).await?,
            DatabaseDriver::Mysql => create_article_mysql(self.pool.mysql()?, input).await?,
        };
        self.get_by_id(id)
            .await?
            .context("Article vanished after insert")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_article_by_id_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => get_article_by_id_mysql(self.pool.mysql()?, id).await?,
        };
        row.map(Article::try_from).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_article_by_slug_sqlite(self.pool.sqlite()?, slug).await?,
            DatabaseDriver::Mysql => get_article_by_slug_mysql(self.pool.mysql()?, slug).await?,
        };
        row.map(Article::try_from).transpose()
    }

    async fn list(&self, filter: &ArticleFilter, offset: i64, limit: i64) -> Result<Vec<Article>> {
        let rows = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_articles_sqlite(self.pool.sqlite()?, filter, offset, limit).await?
            }
            DatabaseDriver::Mysql => {
                list_articles_mysql(self.pool.mysql()?, filter, offset, limit).await?
            }
        };
        into_articles(rows)
    }

    async fn count(&self, filter: &ArticleFilter) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_articles_sqlite(self.pool.sqlite()?, filter).await,
            DatabaseDriver::Mysql => count_articles_mysql(self.pool.mysql()?, filter).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdateArticleInput) -> Result<Option<Article>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let values = ArticleValues::merge(existing, input);

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_article_sqlite(self.pool.sqlite()?, id, &values).await?
            }
            DatabaseDriver::Mysql => update_article_mysql(self.pool.mysql()?, id, &values).await?,
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_article_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => delete_article_mysql(self.pool.mysql()?, id).await?,
        };
        Ok(affected > 0)
    }

    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let exclude = exclude_id.unwrap_or(0);
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_slug_sqlite(self.pool.sqlite()?, slug, exclude).await?
            }
            DatabaseDriver::Mysql => count_slug_mysql(self.pool.mysql()?, slug, exclude).await?,
        };
        Ok(count > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_article_sqlite(pool: &SqlitePool, input: &CreateArticleInput) -> Result<i64> {
    let now = Utc::now();
    let published_at = resolve_published_at(input.status, None);
    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, slug, summary, content, featured_image_url, status,
            is_breaking, is_featured, category_id, state_id, author_id,
            meta_title, meta_description, meta_keywords, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.summary)
    .bind(&input.content)
    .bind(&input.featured_image_url)
    .bind(input.status.as_str())
    .bind(input.is_breaking)
    .bind(input.is_featured)
    .bind(input.category_id)
    .bind(input.state_id)
    .bind(input.author_id)
    .bind(&input.meta_title)
    .bind(&input.meta_description)
    .bind(&input.meta_keywords)
    .bind(published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;
    Ok(result.last_insert_rowid())
}

async fn get_article_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<ArticleRow>> {
    let sql = format!("{} WHERE a.id = ?", SELECT_ARTICLE);
    sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")
}

async fn get_article_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<ArticleRow>> {
    let sql = format!("{} WHERE a.slug = ?", SELECT_ARTICLE);
    sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by slug")
}

async fn list_articles_sqlite(
    pool: &SqlitePool,
    filter: &ArticleFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<ArticleRow>> {
    let (where_clause, values) = filter_clause(filter);
    let sql = format!(
        "{}{}{} LIMIT ? OFFSET ?",
        SELECT_ARTICLE,
        where_clause,
        order_clause(filter)
    );
    let mut query = sqlx::query_as::<_, ArticleRow>(&sql);
    for value in values {
        query = match value {
            FilterValue::Int(v) => query.bind(v),
            FilterValue::Text(v) => query.bind(v),
            FilterValue::Bool(v) => query.bind(v),
        };
    }
    query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list articles")
}

async fn count_articles_sqlite(pool: &SqlitePool, filter: &ArticleFilter) -> Result<i64> {
    let (where_clause, values) = filter_clause(filter);
    let sql = format!("{}{}", COUNT_ARTICLE, where_clause);
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for value in values {
        query = match value {
            FilterValue::Int(v) => query.bind(v),
            FilterValue::Text(v) => query.bind(v),
            FilterValue::Bool(v) => query.bind(v),
        };
    }
    query
        .fetch_one(pool)
        .await
        .context("Failed to count articles")
}

async fn update_article_sqlite(pool: &SqlitePool, id: i64, values: &ArticleValues) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE articles SET title = ?, slug = ?, summary = ?, content = ?, featured_image_url = ?,
            status = ?, is_breaking = ?, is_featured = ?, category_id = ?, state_id = ?,
            meta_title = ?, meta_description = ?, meta_keywords = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&values.title)
    .bind(&values.slug)
    .bind(&values.summary)
    .bind(&values.content)
    .bind(&values.featured_image_url)
    .bind(values.status.as_str())
    .bind(values.is_breaking)
    .bind(values.is_featured)
    .bind(values.category_id)
    .bind(values.state_id)
    .bind(&values.meta_title)
    .bind(&values.meta_description)
    .bind(&values.meta_keywords)
    .bind(values.published_at)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update article")?;
    Ok(())
}

async fn delete_article_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete article")?;
    Ok(result.rows_affected())
}

async fn count_slug_sqlite(pool: &SqlitePool, slug: &str, exclude: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE slug = ? AND id != ?")
        .bind(slug)
        .bind(exclude)
        .fetch_one(pool)
        .await
        .context("Failed to check article slug")
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_article_mysql(pool: &MySqlPool, input: &CreateArticleInput) -> Result<i64> {
    let now = Utc::now();
    let published_at = resolve_published_at(input.status, None);
    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, slug, summary, content, featured_image_url, status,
            is_breaking, is_featured, category_id, state_id, author_id,
            meta_title, meta_description, meta_keywords, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.summary)
    .bind(&input.content)
    .bind(&input.featured_image_url)
    .bind(input.status.as_str())
    .bind(input.is_breaking)
    .bind(input.is_featured)
    .bind(input.category_id)
    .bind(input.state_id)
    .bind(input.author_id)
    .bind(&input.meta_title)
    .bind(&input.meta_description)
    .bind(&input.meta_keywords)
    .bind(published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;
    Ok(result.last_insert_id() as i64)
}

async fn get_article_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<ArticleRow>> {
    let sql = format!("{} WHERE a.id = ?", SELECT_ARTICLE);
    sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")
}

async fn get_article_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<ArticleRow>> {
    let sql = format!("{} WHERE a.slug = ?", SELECT_ARTICLE);
    sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by slug")
}

async fn list_articles_mysql(
    pool: &MySqlPool,
    filter: &ArticleFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<ArticleRow>> {
    let (where_clause, values) = filter_clause(filter);
    let sql = format!(
        "{}{}{} LIMIT ? OFFSET ?",
        SELECT_ARTICLE,
        where_clause,
        order_clause(filter)
    );
    let mut query = sqlx::query_as::<_, ArticleRow>(&sql);
    for value in values {
        query = match value {
            FilterValue::Int(v) => query.bind(v),
            FilterValue::Text(v) => query.bind(v),
            FilterValue::Bool(v) => query.bind(v),
        };
    }
    query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list articles")
}

async fn count_articles_mysql(pool: &MySqlPool, filter: &ArticleFilter) -> Result<i64> {
    let (where_clause, values) = filter_clause(filter);
    let sql = format!("{}{}", COUNT_ARTICLE, where_clause);
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for value in values {
        query = match value {
            FilterValue::Int(v) => query.bind(v),
            FilterValue::Text(v) => query.bind(v),
            FilterValue::Bool(v) => query.bind(v),
        };
    }
    query
        .fetch_one(pool)
        .await
        .context("Failed to count articles")
}

async fn update_article_mysql(pool: &MySqlPool, id: i64, values: &ArticleValues) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE articles SET title = ?, slug = ?, summary = ?, content = ?, featured_image_url = ?,
            status = ?, is_breaking = ?, is_featured = ?, category_id = ?, state_id = ?,
            meta_title = ?, meta_description = ?, meta_keywords = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&values.title)
    .bind(&values.slug)
    .bind(&values.summary)
    .bind(&values.content)
    .bind(&values.featured_image_url)
    .bind(values.status.as_str())
    .bind(values.is_breaking)
    .bind(values.is_featured)
    .bind(values.category_id)
    .bind(values.state_id)
    .bind(&values.meta_title)
    .bind(&values.meta_description)
    .bind(&values.meta_keywords)
    .bind(values.published_at)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update article")?;
    Ok(())
}

async fn delete_article_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete article")?;
    Ok(result.rows_affected())
}

async fn count_slug_mysql(pool: &MySqlPool, slug: &str, exclude: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE slug = ? AND id != ?")
        .bind(slug)
        .bind(exclude)
        .fetch_one(pool)
        .await
        .context("Failed to check article slug")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup() -> SqlxArticleRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        pool.execute(
            "INSERT INTO users (username, email, full_name, password_hash, role) \
             VALUES ('anita', 'anita@example.in', 'Anita Desai', 'x', 'editor')",
        )
        .await
        .unwrap();
        SqlxArticleRepository::new(pool)
    }

    fn input(title: &str, slug: &str) -> CreateArticleInput {
        CreateArticleInput::new(title.to_string(), slug.to_string(), "Body".to_string(), 1)
    }

    #[tokio::test]
    async fn test_create_returns_submitted_fields_with_joins() {
        let repo = setup().await;
        let created = repo
            .create(
                &input("Assembly session opens", "assembly-session-opens")
                    .with_summary("Monsoon session begins")
                    .with_category(1)
                    .with_state(1),
            )
            .await
            .unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Assembly session opens");
        assert_eq!(fetched.summary.as_deref(), Some("Monsoon session begins"));
        assert_eq!(fetched.status, ArticleStatus::Draft);
        assert_eq!(fetched.category_name.as_deref(), Some("Politics"));
        assert_eq!(fetched.state_name.as_deref(), Some("Maharashtra"));
        assert_eq!(fetched.author_name.as_deref(), Some("Anita Desai"));
        assert!(fetched.published_at.is_none());
    }

    #[tokio::test]
    async fn test_create_published_sets_published_at() {
        let repo = setup().await;
        let article = repo
            .create(&input("Live now", "live-now").with_status(ArticleStatus::Published))
            .await
            .unwrap();
        assert!(article.published_at.is_some());
    }

    #[tokio::test]
    async fn test_update_published_at_transitions() {
        let repo = setup().await;
        let article = repo.create(&input("Draft", "draft")).await.unwrap();

        let published = repo
            .update(
                article.id,
                &UpdateArticleInput::new().with_status(ArticleStatus::Published),
            )
            .await
            .unwrap()
            .unwrap();
        let first_published = published.published_at.unwrap();

        let retitled = repo
            .update(article.id, &UpdateArticleInput::new().with_title("Renamed"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retitled.published_at, Some(first_published));

        let pulled = repo
            .update(
                article.id,
                &UpdateArticleInput::new().with_status(ArticleStatus::Archived),
            )
            .await
            .unwrap()
            .unwrap();
        assert!(pulled.published_at.is_none());
    }

    #[tokio::test]
    async fn test_update_clears_references() {
        let repo = setup().await;
        let article = repo
            .create(&input("Cricket", "cricket").with_category(2))
            .await
            .unwrap();

        let update = UpdateArticleInput {
            category_id: Some(None),
            summary: Some(String::new()),
            ..Default::default()
        };
        let updated = repo.update(article.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.category_id, None);
        assert_eq!(updated.category_name, None);
        assert_eq!(updated.summary, None);

        assert!(repo.update(999, &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_count() {
        let repo = setup().await;
        repo.create(&input("Budget passed", "budget-passed").with_category(4).with_status(ArticleStatus::Published))
            .await
            .unwrap();
        repo.create(&input("Flood alert", "flood-alert").with_state(2).breaking().with_status(ArticleStatus::Published))
            .await
            .unwrap();
        repo.create(&input("Draft budget notes", "draft-budget-notes"))
            .await
            .unwrap();

        let published = ArticleFilter::published();
        assert_eq!(repo.count(&published).await.unwrap(), 2);
        assert_eq!(repo.count(&ArticleFilter::default()).await.unwrap(), 3);

        let breaking = repo.list(&published.clone().breaking(), 0, 10).await.unwrap();
        assert_eq!(breaking.len(), 1);
        assert_eq!(breaking[0].slug, "flood-alert");

        let by_state = ArticleFilter {
            state_slug: Some("uttar-pradesh".to_string()),
            ..ArticleFilter::published()
        };
        assert_eq!(repo.list(&by_state, 0, 10).await.unwrap().len(), 1);

        let by_category = ArticleFilter {
            category_slug: Some("business".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&by_category).await.unwrap(), 1);

        let search = ArticleFilter {
            search: Some("budget".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&search).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_with_pagination() {
        let repo = setup().await;
        for i in 0..5 {
            repo.create(&input(&format!("Story {}", i), &format!("story-{}", i)))
                .await
                .unwrap();
        }

        let page = repo.list(&ArticleFilter::default(), 0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].slug, "story-4");
        assert_eq!(page[1].slug, "story-3");

        let last = repo.list(&ArticleFilter::default(), 4, 2).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].slug, "story-0");
    }

    #[tokio::test]
    async fn test_exists_by_slug_and_delete() {
        let repo = setup().await;
        let article = repo.create(&input("Unique", "unique")).await.unwrap();

        assert!(repo.exists_by_slug("unique", None).await.unwrap());
        assert!(!repo.exists_by_slug("unique", Some(article.id)).await.unwrap());

        assert!(repo.delete(article.id).await.unwrap());
        assert!(!repo.delete(article.id).await.unwrap());
        assert!(!repo.exists_by_slug("unique", None).await.unwrap());
    }

    #[test]
    fn test_resolve_published_at() {
        let earlier = Utc::now() - Duration::days(2);
        assert_eq!(
            resolve_published_at(ArticleStatus::Published, Some(earlier)),
            Some(earlier)
        );
        assert!(resolve_published_at(ArticleStatus::Published, None).is_some());
        assert!(resolve_published_at(ArticleStatus::Draft, Some(earlier)).is_none());
    }

    #[test]
    fn test_filter_clause_placeholders() {
        let filter = ArticleFilter {
            search: Some("  rain ".to_string()),
            ..ArticleFilter::published().breaking()
        };
        let (clause, values) = filter_clause(&filter);
        assert_eq!(clause.matches('?').count(), values.len());
        assert_eq!(values.last(), Some(&FilterValue::Text("%rain%".to_string())));
        assert!(filter_clause(&ArticleFilter::default()).0.is_empty());
    }
}
