//! Category service
//!
//! News sections (Politics, Sports, ...). Names and slugs are unique; a
//! blank slug is generated from the name. Deleting a category leaves its
//! articles and videos uncategorized.

use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use crate::services::article::generate_slug;
use anyhow::Context;
use std::sync::Arc;

/// Error types for category and state operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Name or slug already in use
    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Trim the name and resolve the slug of a create request
pub(crate) fn normalize_create(
    mut input: CreateCategoryInput,
) -> Result<CreateCategoryInput, CategoryServiceError> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(CategoryServiceError::ValidationError(
            "Name cannot be empty".to_string(),
        ));
    }
    let source = if input.slug.trim().is_empty() {
        &input.name
    } else {
        &input.slug
    };
    input.slug = normalize_slug(source)?;
    Ok(input)
}

/// Trim and validate the provided fields of an update request
pub(crate) fn normalize_update(
    mut input: UpdateCategoryInput,
) -> Result<UpdateCategoryInput, CategoryServiceError> {
    if let Some(name) = input.name.take() {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }
        input.name = Some(name);
    }
    if let Some(slug) = input.slug.take() {
        input.slug = Some(normalize_slug(&slug)?);
    }
    Ok(input)
}

fn normalize_slug(source: &str) -> Result<String, CategoryServiceError> {
    let slug = generate_slug(source);
    if slug.is_empty() {
        return Err(CategoryServiceError::ValidationError(
            "Slug cannot be empty".to_string(),
        ));
    }
    Ok(slug)
}

pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// All categories ordered by name
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category by slug")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("category '{}'", slug)))
    }

    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let input = normalize_create(input)?;
        self.ensure_unique(&input.name, &input.slug, None).await?;

        let category = self
            .repo
            .create(&input)
            .await
            .context("Failed to create category")?;
        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let input = normalize_update(input)?;
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("category {}", id)))?;

        let name = input.name.as_deref().unwrap_or(&existing.name);
        let slug = input.slug.as_deref().unwrap_or(&existing.slug);
        self.ensure_unique(name, slug, Some(id)).await?;

        self.repo
            .update(id, &input)
            .await
            .context("Failed to update category")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("category {}", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete category")? {
            return Err(CategoryServiceError::NotFound(format!("category {}", id)));
        }
        Ok(())
    }

    async fn ensure_unique(
        &self,
        name: &str,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), CategoryServiceError> {
        if self
            .repo
            .name_or_slug_taken(name, slug, exclude_id)
            .await
            .context("Failed to check category uniqueness")?
        {
            return Err(CategoryServiceError::Conflict(format!(
                "A category named '{}' or with slug '{}' already exists",
                name, slug
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> CategoryService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        CategoryService::new(SqlxCategoryRepository::boxed(pool))
    }

    #[test]
    fn test_normalize_create_generates_slug() {
        let input = normalize_create(CreateCategoryInput::new("  World News ", "")).unwrap();
        assert_eq!(input.name, "World News");
        assert_eq!(input.slug, "world-news");

        assert!(normalize_create(CreateCategoryInput::new(" ", "")).is_err());
    }

    #[tokio::test]
    async fn test_create_and_get_by_slug() {
        let service = setup_test_service().await;
        let created = service
            .create(CreateCategoryInput {
                description: Some("Stories from abroad".to_string()),
                ..CreateCategoryInput::new("World", "")
            })
            .await
            .unwrap();
        assert_eq!(created.slug, "world");

        let fetched = service.get_by_slug("world").await.unwrap();
        assert_eq!(fetched.description.as_deref(), Some("Stories from abroad"));
        assert_eq!(service.list().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_duplicate_name_or_slug_conflicts() {
        let service = setup_test_service().await;
        let by_name = service.create(CreateCategoryInput::new("sports", "games")).await;
        assert!(matches!(by_name, Err(CategoryServiceError::Conflict(_))));

        let by_slug = service.create(CreateCategoryInput::new("Cricket", "sports")).await;
        assert!(matches!(by_slug, Err(CategoryServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_rules() {
        let service = setup_test_service().await;
        let health = service.get_by_slug("health").await.unwrap();

        let renamed = service
            .update(
                health.id,
                UpdateCategoryInput {
                    name: Some("Health & Wellness".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Health & Wellness");
        assert_eq!(renamed.slug, "health");

        let clash = service
            .update(
                health.id,
                UpdateCategoryInput {
                    slug: Some("politics".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(clash, Err(CategoryServiceError::Conflict(_))));

        let missing = service.update(999, UpdateCategoryInput::default()).await;
        assert!(matches!(missing, Err(CategoryServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_category() {
        let service = setup_test_service().await;
        let business = service.get_by_slug("business").await.unwrap();
        service.delete(business.id).await.unwrap();
        assert!(matches!(
            service.get_by_slug("business").await,
            Err(CategoryServiceError::NotFound(_))
        ));
        assert!(service.delete(business.id).await.is_err());
    }
}
