//! Live stream service

use crate::db::repositories::LiveStreamRepository;
use crate::models::{CreateLiveStreamInput, LiveStream, UpdateLiveStreamInput};
use anyhow::Context;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum LiveStreamServiceError {
    #[error("Live stream not found: {0}")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct LiveStreamService {
    repo: Arc<dyn LiveStreamRepository>,
}

impl LiveStreamService {
    pub fn new(repo: Arc<dyn LiveStreamRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        mut input: CreateLiveStreamInput,
    ) -> Result<LiveStream, LiveStreamServiceError> {
        input.title = required(&input.title, "title")?;
        input.stream_url = required(&input.stream_url, "stream URL")?;

        let stream = self
            .repo
            .create(&input)
            .await
            .context("Failed to create live stream")?;
        tracing::info!(stream_id = stream.id, active = stream.is_active, "Live stream created");
        Ok(stream)
    }

    pub async fn update(
        &self,
        id: i64,
        mut input: UpdateLiveStreamInput,
    ) -> Result<LiveStream, LiveStreamServiceError> {
        if let Some(title) = input.title.take() {
            input.title = Some(required(&title, "title")?);
        }
        if let Some(url) = input.stream_url.take() {
            input.stream_url = Some(required(&url, "stream URL")?);
        }
        self.repo
            .update(id, &input)
            .await
            .context("Failed to update live stream")?
            .ok_or(LiveStreamServiceError::NotFound(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), LiveStreamServiceError> {
        if !self
            .repo
            .delete(id)
            .await
            .context("Failed to delete live stream")?
        {
            return Err(LiveStreamServiceError::NotFound(id));
        }
        Ok(())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<LiveStream, LiveStreamServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get live stream")?
            .ok_or(LiveStreamServiceError::NotFound(id))
    }

    /// Every stream, newest first
    pub async fn list(&self) -> Result<Vec<LiveStream>, LiveStreamServiceError> {
        Ok(self
            .repo
            .list(false)
            .await
            .context("Failed to list live streams")?)
    }

    /// Streams currently on air, newest first
    pub async fn list_active(&self) -> Result<Vec<LiveStream>, LiveStreamServiceError> {
        Ok(self
            .repo
            .list(true)
            .await
            .context("Failed to list active live streams")?)
    }

    pub async fn count_active(&self) -> Result<i64, LiveStreamServiceError> {
        Ok(self
            .repo
            .count_active()
            .await
            .context("Failed to count active live streams")?)
    }

    /// Put a stream on or off air
    pub async fn toggle_active(&self, id: i64) -> Result<LiveStream, LiveStreamServiceError> {
        let stream = self.get_by_id(id).await?;
        let input = UpdateLiveStreamInput {
            is_active: Some(!stream.is_active),
            ..Default::default()
        };
        let updated = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to toggle live stream")?
            .ok_or(LiveStreamServiceError::NotFound(id))?;
        tracing::info!(stream_id = id, active = updated.is_active, "Live stream toggled");
        Ok(updated)
    }
}

fn required(value: &str, field: &str) -> Result<String, LiveStreamServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LiveStreamServiceError::ValidationError(format!(
            "Live stream {} cannot be empty",
            field
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxLiveStreamRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> LiveStreamService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        LiveStreamService::new(SqlxLiveStreamRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_defaults_to_inactive() {
        let service = setup_test_service().await;
        let stream = service
            .create(CreateLiveStreamInput::new(" Assembly session ", "https://youtu.be/live1"))
            .await
            .unwrap();
        assert_eq!(stream.title, "Assembly session");
        assert!(!stream.is_active);
        assert!(service.list_active().await.unwrap().is_empty());
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_active() {
        let service = setup_test_service().await;
        let stream = service
            .create(CreateLiveStreamInput::new("Results night", "https://youtu.be/r"))
            .await
            .unwrap();

        let on_air = service.toggle_active(stream.id).await.unwrap();
        assert!(on_air.is_active);
        assert_eq!(service.count_active().await.unwrap(), 1);

        let off_air = service.toggle_active(stream.id).await.unwrap();
        assert!(!off_air.is_active);
        assert_eq!(service.count_active().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_validation_and_not_found() {
        let service = setup_test_service().await;
        assert!(matches!(
            service.create(CreateLiveStreamInput::new("Title", "  ")).await,
            Err(LiveStreamServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.toggle_active(42).await,
            Err(LiveStreamServiceError::NotFound(42))
        ));
        assert!(matches!(
            service.delete(42).await,
            Err(LiveStreamServiceError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_update_fields() {
        let service = setup_test_service().await;
        let stream = service
            .create(CreateLiveStreamInput::new("Match", "https://youtu.be/m").active())
            .await
            .unwrap();
        let updated = service
            .update(
                stream.id,
                UpdateLiveStreamInput {
                    title: Some("Final match".to_string()),
                    description: Some("Live from the stadium".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Final match");
        assert_eq!(updated.description.as_deref(), Some("Live from the stadium"));
        assert!(updated.is_active);
    }
}
