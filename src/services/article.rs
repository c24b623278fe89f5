//! Article service
//!
//! Business rules for the newsroom's stories:
//! - title and content are required, slugs are generated from the title
//! - slugs are unique
//! - category and state references must exist
//! - breaking, featured and publish toggles for the breaking-news desk
//! - public reads only ever see published articles

use crate::db::repositories::{ArticleRepository, CategoryRepository, RegionRepository};
use crate::models::{
    Article, ArticleFilter, ArticleStatus, CreateArticleInput, ListParams, PagedResult,
    UpdateArticleInput,
};
use anyhow::Context;
use std::sync::Arc;

/// Most items the breaking ticker shows
pub const TICKER_LIMIT: i64 = 10;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Article slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Article service
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    region_repo: Arc<dyn RegionRepository>,
}

impl ArticleService {
    pub fn new(
        repo: Arc<dyn ArticleRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        region_repo: Arc<dyn RegionRepository>,
    ) -> Self {
        Self {
            repo,
            category_repo,
            region_repo,
        }
    }

    /// Create an article. A blank slug is generated from the title.
    pub async fn create(
        &self,
        mut input: CreateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        validate_required(&input.title, "title")?;
        validate_required(&input.content, "content")?;

        input.title = input.title.trim().to_string();
        input.slug = resolve_slug(&input.slug, &input.title)?;

        if self
            .repo
            .exists_by_slug(&input.slug, None)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(ArticleServiceError::DuplicateSlug(input.slug));
        }
        self.check_references(input.category_id, input.state_id).await?;

        let article = self
            .repo
            .create(&input)
            .await
            .context("Failed to create article")?;

        tracing::info!(article_id = article.id, status = %article.status, "Article created");
        Ok(article)
    }

    /// Quick-create for the breaking desk: always breaking, published unless
    /// a status is given.
    pub async fn create_breaking(
        &self,
        author_id: i64,
        title: String,
        content: String,
        status: Option<ArticleStatus>,
    ) -> Result<Article, ArticleServiceError> {
        let input = CreateArticleInput::new(title, String::new(), content, author_id)
            .with_status(status.unwrap_or(ArticleStatus::Published))
            .breaking();
        self.create(input).await
    }

    /// Apply a partial update
    pub async fn update(
        &self,
        id: i64,
        mut input: UpdateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        if let Some(title) = &input.title {
            validate_required(title, "title")?;
            input.title = Some(title.trim().to_string());
        }
        if let Some(content) = &input.content {
            validate_required(content, "content")?;
        }

        let existing = self.require(id).await?;

        if let Some(slug) = &input.slug {
            let title = input.title.as_deref().unwrap_or(&existing.title);
            let slug = resolve_slug(slug, title)?;
            if slug != existing.slug
                && self
                    .repo
                    .exists_by_slug(&slug, Some(id))
                    .await
                    .context("Failed to check slug uniqueness")?
            {
                return Err(ArticleServiceError::DuplicateSlug(slug));
            }
            input.slug = Some(slug);
        }
        self.check_references(input.category_id.flatten(), input.state_id.flatten())
            .await?;

        self.repo
            .update(id, &input)
            .await
            .context("Failed to update article")?
            .ok_or_else(|| ArticleServiceError::NotFound(id.to_string()))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ArticleServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete article")?;
        if !deleted {
            return Err(ArticleServiceError::NotFound(id.to_string()));
        }
        tracing::info!(article_id = id, "Article deleted");
        Ok(())
    }

    /// Any article by ID, regardless of status
    pub async fn get_by_id(&self, id: i64) -> Result<Article, ArticleServiceError> {
        self.require(id).await
    }

    /// A published article by slug; drafts and archived stories are not found
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Article, ArticleServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get article by slug")?
            .filter(Article::is_published)
            .ok_or_else(|| ArticleServiceError::NotFound(slug.to_string()))
    }

    /// Desk listing with any filter
    pub async fn list(
        &self,
        filter: &ArticleFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Article>, ArticleServiceError> {
        let items = self
            .repo
            .list(filter, params.offset(), params.limit())
            .await
            .context("Failed to list articles")?;
        let total = self
            .repo
            .count(filter)
            .await
            .context("Failed to count articles")?;
        Ok(PagedResult::new(items, total, params))
    }

    /// Public listing; the status filter is forced to published
    pub async fn list_published(
        &self,
        filter: ArticleFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Article>, ArticleServiceError> {
        let filter = ArticleFilter {
            status: Some(ArticleStatus::Published),
            ..filter
        };
        self.list(&filter, params).await
    }

    /// Up to `limit` published articles matching a filter, newest first
    pub async fn latest(
        &self,
        filter: ArticleFilter,
        limit: i64,
    ) -> Result<Vec<Article>, ArticleServiceError> {
        let filter = ArticleFilter {
            status: Some(ArticleStatus::Published),
            ..filter
        };
        Ok(self
            .repo
            .list(&filter, 0, limit)
            .await
            .context("Failed to list latest articles")?)
    }

    /// Published breaking stories for the ticker
    pub async fn breaking_ticker(&self) -> Result<Vec<Article>, ArticleServiceError> {
        self.latest(ArticleFilter::default().breaking(), TICKER_LIMIT)
            .await
    }

    pub async fn count(&self, filter: &ArticleFilter) -> Result<i64, ArticleServiceError> {
        Ok(self
            .repo
            .count(filter)
            .await
            .context("Failed to count articles")?)
    }

    pub async fn toggle_breaking(&self, id: i64) -> Result<Article, ArticleServiceError> {
        let article = self.require(id).await?;
        self.update(id, UpdateArticleInput::new().with_breaking(!article.is_breaking))
            .await
    }

    pub async fn toggle_featured(&self, id: i64) -> Result<Article, ArticleServiceError> {
        let article = self.require(id).await?;
        self.update(id, UpdateArticleInput::new().with_featured(!article.is_featured))
            .await
    }

    /// Published goes back to draft, anything else goes live
    pub async fn toggle_publish(&self, id: i64) -> Result<Article, ArticleServiceError> {
        let article = self.require(id).await?;
        let status = if article.is_published() {
            ArticleStatus::Draft
        } else {
            ArticleStatus::Published
        };
        self.update(id, UpdateArticleInput::new().with_status(status))
            .await
    }

    async fn require(&self, id: i64) -> Result<Article, ArticleServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound(id.to_string()))
    }

    async fn check_references(
        &self,
        category_id: Option<i64>,
        state_id: Option<i64>,
    ) -> Result<(), ArticleServiceError> {
        if let Some(category_id) = category_id {
            if self
                .category_repo
                .get_by_id(category_id)
                .await
                .context("Failed to check category")?
                .is_none()
            {
                return Err(ArticleServiceError::ValidationError(format!(
                    "Category {} does not exist",
                    category_id
                )));
            }
        }
        if let Some(state_id) = state_id {
            if self
                .region_repo
                .get_by_id(state_id)
                .await
                .context("Failed to check state")?
                .is_none()
            {
                return Err(ArticleServiceError::ValidationError(format!(
                    "State {} does not exist",
                    state_id
                )));
            }
        }
        Ok(())
    }
}

fn validate_required(value: &str, field: &str) -> Result<(), ArticleServiceError> {
    if value.trim().is_empty() {
        return Err(ArticleServiceError::ValidationError(format!(
            "Article {} cannot be empty",
            field
        )));
    }
    Ok(())
}

/// Normalize a requested slug, falling back to the title when it is blank
fn resolve_slug(requested: &str, title: &str) -> Result<String, ArticleServiceError> {
    let source = if requested.trim().is_empty() {
        title
    } else {
        requested
    };
    let slug = generate_slug(source);
    if slug.is_empty() {
        return Err(ArticleServiceError::ValidationError(
            "Could not derive a slug; provide one explicitly".to_string(),
        ));
    }
    Ok(slug)
}

/// Generate a URL slug.
///
/// Lowercases, keeps ASCII alphanumerics and non-ASCII letters (Devanagari
/// headlines stay readable), turns everything else into `-`, collapses runs
/// and trims the ends.
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.to_lowercase().chars() {
        let keep = c.is_ascii_alphanumeric() || (!c.is_ascii() && c.is_alphanumeric())
            || is_combining_mark(c);
        if keep {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Indic vowel signs and viramas are marks, not alphanumerics, but are part
/// of the word they sit in.
fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0900..=0x0903 | 0x093A..=0x094F | 0x0951..=0x0957 | 0x0962..=0x0963)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxArticleRepository, SqlxCategoryRepository, SqlxRegionRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_test_service() -> (DynDatabasePool, ArticleService) {
        let pool = create_test_pool()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool.execute(
            "INSERT INTO users (username, email, full_name, password_hash, role) \
             VALUES ('desk', 'desk@example.in', 'Desk Editor', 'x', 'editor')",
        )
        .await
        .expect("Failed to create test user");

        let service = ArticleService::new(
            SqlxArticleRepository::boxed(pool.clone()),
            SqlxCategoryRepository::boxed(pool.clone()),
            SqlxRegionRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    fn draft(title: &str) -> CreateArticleInput {
        CreateArticleInput::new(title.to_string(), String::new(), "Story body".to_string(), 1)
    }

    // ========================================================================
    // Slug generation
    // ========================================================================

    #[test]
    fn test_generate_slug_simple() {
        assert_eq!(generate_slug("Monsoon Hits Kerala"), "monsoon-hits-kerala");
    }

    #[test]
    fn test_generate_slug_punctuation_and_runs() {
        assert_eq!(generate_slug("  Rain, Rain -- Go Away!! "), "rain-rain-go-away");
        assert_eq!(generate_slug("snake_case_title"), "snake-case-title");
    }

    #[test]
    fn test_generate_slug_devanagari() {
        assert_eq!(generate_slug("मुंबई में बारिश"), "मुंबई-में-बारिश");
        assert_eq!(generate_slug("IPL 2024: फाइनल"), "ipl-2024-फाइनल");
    }

    #[test]
    fn test_generate_slug_only_symbols() {
        assert_eq!(generate_slug("!!! ???"), "");
    }

    // ========================================================================
    // Create
    // ========================================================================

    #[tokio::test]
    async fn test_create_generates_slug_and_keeps_fields() {
        let (_pool, service) = setup_test_service().await;
        let article = service
            .create(
                draft("Cabinet Reshuffle Announced")
                    .with_summary("Six new ministers")
                    .with_category(1)
                    .with_state(2),
            )
            .await
            .unwrap();

        assert_eq!(article.slug, "cabinet-reshuffle-announced");
        assert_eq!(article.summary.as_deref(), Some("Six new ministers"));
        assert_eq!(article.category_name.as_deref(), Some("Politics"));
        assert_eq!(article.state_name.as_deref(), Some("Uttar Pradesh"));
        assert_eq!(article.author_name.as_deref(), Some("Desk Editor"));
        assert_eq!(article.status, ArticleStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let (_pool, service) = setup_test_service().await;

        let no_title = service.create(draft("   ")).await;
        assert!(matches!(no_title, Err(ArticleServiceError::ValidationError(_))));

        let mut no_content = draft("Headline");
        no_content.content = "\n\t ".to_string();
        let result = service.create(no_content).await;
        assert!(matches!(result, Err(ArticleServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_slug_conflicts() {
        let (_pool, service) = setup_test_service().await;
        service.create(draft("Same Headline")).await.unwrap();

        let result = service.create(draft("Same headline!")).await;
        assert!(matches!(result, Err(ArticleServiceError::DuplicateSlug(slug)) if slug == "same-headline"));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_references() {
        let (_pool, service) = setup_test_service().await;
        let result = service.create(draft("Orphan").with_category(99)).await;
        assert!(matches!(result, Err(ArticleServiceError::ValidationError(_))));

        let result = service.create(draft("Orphan").with_state(99)).await;
        assert!(matches!(result, Err(ArticleServiceError::ValidationError(_))));
    }

    // ========================================================================
    // Update and toggles
    // ========================================================================

    #[tokio::test]
    async fn test_update_slug_conflict() {
        let (_pool, service) = setup_test_service().await;
        service.create(draft("First")).await.unwrap();
        let second = service.create(draft("Second")).await.unwrap();

        let update = UpdateArticleInput {
            slug: Some("first".to_string()),
            ..Default::default()
        };
        let result = service.update(second.id, update).await;
        assert!(matches!(result, Err(ArticleServiceError::DuplicateSlug(_))));

        let keep_own = UpdateArticleInput {
            slug: Some("Second".to_string()),
            ..Default::default()
        };
        assert_eq!(service.update(second.id, keep_own).await.unwrap().slug, "second");
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let (_pool, service) = setup_test_service().await;
        let result = service
            .update(42, UpdateArticleInput::new().with_title("x"))
            .await;
        assert!(matches!(result, Err(ArticleServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_publish_sets_and_clears_published_at() {
        let (_pool, service) = setup_test_service().await;
        let article = service.create(draft("Toggle me")).await.unwrap();

        let live = service.toggle_publish(article.id).await.unwrap();
        assert_eq!(live.status, ArticleStatus::Published);
        assert!(live.published_at.is_some());

        let pulled = service.toggle_publish(article.id).await.unwrap();
        assert_eq!(pulled.status, ArticleStatus::Draft);
        assert!(pulled.published_at.is_none());
    }

    #[tokio::test]
    async fn test_toggle_breaking_and_featured() {
        let (_pool, service) = setup_test_service().await;
        let article = service.create(draft("Flags")).await.unwrap();

        assert!(service.toggle_breaking(article.id).await.unwrap().is_breaking);
        assert!(service.toggle_featured(article.id).await.unwrap().is_featured);
        assert!(!service.toggle_breaking(article.id).await.unwrap().is_breaking);
    }

    // ========================================================================
    // Breaking desk and public reads
    // ========================================================================

    #[tokio::test]
    async fn test_create_breaking_defaults_to_published() {
        let (_pool, service) = setup_test_service().await;
        let article = service
            .create_breaking(1, "Bridge collapse".to_string(), "Details".to_string(), None)
            .await
            .unwrap();
        assert!(article.is_breaking);
        assert!(article.is_published());
        assert_eq!(article.slug, "bridge-collapse");

        let held = service
            .create_breaking(1, "Unconfirmed".to_string(), "Details".to_string(), Some(ArticleStatus::Draft))
            .await
            .unwrap();
        assert!(!held.is_published());

        let ticker = service.breaking_ticker().await.unwrap();
        assert_eq!(ticker.len(), 1);
        assert_eq!(ticker[0].id, article.id);
    }

    #[tokio::test]
    async fn test_ticker_is_capped() {
        let (_pool, service) = setup_test_service().await;
        for i in 0..12 {
            service
                .create_breaking(1, format!("Alert {}", i), "Body".to_string(), None)
                .await
                .unwrap();
        }
        let ticker = service.breaking_ticker().await.unwrap();
        assert_eq!(ticker.len(), TICKER_LIMIT as usize);
        assert_eq!(ticker[0].title, "Alert 11");
    }

    #[tokio::test]
    async fn test_public_reads_hide_drafts() {
        let (_pool, service) = setup_test_service().await;
        let hidden = service.create(draft("Embargoed")).await.unwrap();
        service
            .create(draft("Public").with_status(ArticleStatus::Published))
            .await
            .unwrap();

        let result = service.get_published_by_slug(&hidden.slug).await;
        assert!(matches!(result, Err(ArticleServiceError::NotFound(_))));
        assert!(service.get_published_by_slug("public").await.is_ok());

        let page = service
            .list_published(ArticleFilter::default(), &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "public");
    }

    #[tokio::test]
    async fn test_delete_article() {
        let (_pool, service) = setup_test_service().await;
        let article = service.create(draft("Short lived")).await.unwrap();
        service.delete(article.id).await.unwrap();
        assert!(matches!(
            service.delete(article.id).await,
            Err(ArticleServiceError::NotFound(_))
        ));
    }
}
