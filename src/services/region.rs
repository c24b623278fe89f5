//! State (region) service
//!
//! Same rules as categories: unique name and slug, slug from the name when
//! blank. States carry no description.

use crate::db::repositories::RegionRepository;
use crate::models::{CreateCategoryInput, Region, UpdateCategoryInput};
use crate::services::category::{normalize_create, normalize_update, CategoryServiceError};
use anyhow::Context;
use std::sync::Arc;

pub struct RegionService {
    repo: Arc<dyn RegionRepository>,
}

impl RegionService {
    pub fn new(repo: Arc<dyn RegionRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Region>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list states")?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Region, CategoryServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get state by slug")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("state '{}'", slug)))
    }

    pub async fn create(&self, input: CreateCategoryInput) -> Result<Region, CategoryServiceError> {
        let input = normalize_create(input)?;
        self.ensure_unique(&input.name, &input.slug, None).await?;
        Ok(self
            .repo
            .create(&input)
            .await
            .context("Failed to create state")?)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Region, CategoryServiceError> {
        let input = normalize_update(input)?;
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get state")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("state {}", id)))?;

        let name = input.name.as_deref().unwrap_or(&existing.name);
        let slug = input.slug.as_deref().unwrap_or(&existing.slug);
        self.ensure_unique(name, slug, Some(id)).await?;

        self.repo
            .update(id, &input)
            .await
            .context("Failed to update state")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("state {}", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete state")? {
            return Err(CategoryServiceError::NotFound(format!("state {}", id)));
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
            .context("Failed to check state uniqueness")?
        {
            return Err(CategoryServiceError::Conflict(format!(
                "A state named '{}' or with slug '{}' already exists",
                name, slug
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxRegionRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> RegionService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        RegionService::new(SqlxRegionRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_state_with_generated_slug() {
        let service = setup_test_service().await;
        let state = service
            .create(CreateCategoryInput::new("West Bengal", ""))
            .await
            .unwrap();
        assert_eq!(state.slug, "west-bengal");
        assert_eq!(service.get_by_slug("west-bengal").await.unwrap().id, state.id);
    }

    #[tokio::test]
    async fn test_state_conflicts_and_missing() {
        let service = setup_test_service().await;
        let dup = service.create(CreateCategoryInput::new("Karnataka", "")).await;
        assert!(matches!(dup, Err(CategoryServiceError::Conflict(_))));

        assert!(matches!(
            service.get_by_slug("atlantis").await,
            Err(CategoryServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(999).await,
            Err(CategoryServiceError::NotFound(_))
        ));
    }
}
