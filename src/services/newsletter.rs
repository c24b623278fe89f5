//! Newsletter service
//!
//! Public signup and unsubscribe, plus the admin subscriber list.

use crate::db::is_unique_violation;
use crate::db::repositories::NewsletterRepository;
use crate::models::{ListParams, NewsletterSubscription, PagedResult};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Loose shape check: something@domain.tld with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

#[derive(Debug, thiserror::Error)]
pub enum NewsletterServiceError {
    #[error("Subscription not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Already subscribed")]
    AlreadySubscribed,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct NewsletterService {
    repo: Arc<dyn NewsletterRepository>,
}

impl NewsletterService {
    pub fn new(repo: Arc<dyn NewsletterRepository>) -> Self {
        Self { repo }
    }

    /// Subscribe an email, reactivating a previous subscription
    pub async fn subscribe(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<NewsletterSubscription, NewsletterServiceError> {
        let email = normalize_email(email)?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let existing = self
            .repo
            .get_by_email(&email)
            .await
            .context("Failed to look up subscription")?;

        let subscription = match existing {
            Some(sub) if sub.is_active => return Err(NewsletterServiceError::AlreadySubscribed),
            Some(sub) => self
                .repo
                .set_active(sub.id, true, name)
                .await
                .context("Failed to reactivate subscription")?
                .ok_or_else(|| NewsletterServiceError::NotFound(email.clone()))?,
            // A concurrent signup for the same address trips the UNIQUE index
            None => self.repo.create(&email, name).await.map_err(|e| {
                if is_unique_violation(&e) {
                    NewsletterServiceError::AlreadySubscribed
                } else {
                    NewsletterServiceError::InternalError(e.context("Failed to create subscription"))
                }
            })?,
        };

        tracing::info!(subscription_id = subscription.id, "Newsletter subscription active");
        Ok(subscription)
    }

    pub async fn unsubscribe(&self, email: &str) -> Result<(), NewsletterServiceError> {
        let email = normalize_email(email)?;
        let sub = self
            .repo
            .get_by_email(&email)
            .await
            .context("Failed to look up subscription")?
            .ok_or_else(|| NewsletterServiceError::NotFound(email.clone()))?;

        if sub.is_active {
            self.repo
                .set_active(sub.id, false, None)
                .await
                .context("Failed to deactivate subscription")?;
        }
        Ok(())
    }

    pub async fn list(
        &self,
        active: Option<bool>,
        params: &ListParams,
    ) -> Result<PagedResult<NewsletterSubscription>, NewsletterServiceError> {
        let items = self
            .repo
            .list(active, params.offset(), params.limit())
            .await
            .context("Failed to list subscriptions")?;
        let total = self
            .repo
            .count(active)
            .await
            .context("Failed to count subscriptions")?;
        Ok(PagedResult::new(items, total, params))
    }

    pub async fn count_active(&self) -> Result<i64, NewsletterServiceError> {
        Ok(self
            .repo
            .count(Some(true))
            .await
            .context("Failed to count subscriptions")?)
    }
}

fn normalize_email(email: &str) -> Result<String, NewsletterServiceError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(NewsletterServiceError::ValidationError(
            "Email is required".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(NewsletterServiceError::ValidationError(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxNewsletterRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> NewsletterService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        NewsletterService::new(SqlxNewsletterRepository::boxed(pool))
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("reader@example.in"));
        assert!(is_valid_email("a.b+news@mail.co.in"));
        assert!(!is_valid_email("reader@"));
        assert!(!is_valid_email("reader example@x.in"));
        assert!(!is_valid_email("no-at-sign.in"));
    }

    #[tokio::test]
    async fn test_subscribe_normalizes_email() {
        let service = setup_test_service().await;
        let sub = service
            .subscribe("  Reader@Example.IN ", Some(" Asha "))
            .await
            .unwrap();
        assert_eq!(sub.email, "reader@example.in");
        assert_eq!(sub.name.as_deref(), Some("Asha"));
        assert!(sub.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_active_subscription() {
        let service = setup_test_service().await;
        service.subscribe("reader@example.in", None).await.unwrap();
        let result = service.subscribe("READER@example.in", None).await;
        assert!(matches!(result, Err(NewsletterServiceError::AlreadySubscribed)));
    }

    #[tokio::test]
    async fn test_concurrent_signups_for_same_email() {
        let service = setup_test_service().await;

        let (a, b) = tokio::join!(
            service.subscribe("reader@example.in", None),
            service.subscribe("Reader@example.in", Some("Asha")),
        );

        assert_eq!([&a, &b].iter().filter(|r| r.is_ok()).count(), 1);
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(NewsletterServiceError::AlreadySubscribed)));
    }

    #[tokio::test]
    async fn test_unsubscribe_then_reactivate() {
        let service = setup_test_service().await;
        let first = service.subscribe("reader@example.in", None).await.unwrap();
        service.unsubscribe("reader@example.in").await.unwrap();
        assert_eq!(service.count_active().await.unwrap(), 0);

        let again = service
            .subscribe("reader@example.in", Some("Asha"))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert!(again.is_active);
        assert_eq!(again.name.as_deref(), Some("Asha"));
        assert_eq!(service.count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_email() {
        let service = setup_test_service().await;
        let result = service.unsubscribe("ghost@example.in").await;
        assert!(matches!(result, Err(NewsletterServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let service = setup_test_service().await;
        assert!(matches!(
            service.subscribe("   ", None).await,
            Err(NewsletterServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.subscribe("not-an-email", None).await,
            Err(NewsletterServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_with_active_filter() {
        let service = setup_test_service().await;
        for email in ["a@x.in", "b@x.in", "c@x.in"] {
            service.subscribe(email, None).await.unwrap();
        }
        service.unsubscribe("b@x.in").await.unwrap();

        let params = ListParams::default();
        let all = service.list(None, &params).await.unwrap();
        assert_eq!(all.total, 3);
        let active = service.list(Some(true), &params).await.unwrap();
        assert_eq!(active.total, 2);
        let inactive = service.list(Some(false), &params).await.unwrap();
        assert_eq!(inactive.items.len(), 1);
        assert_eq!(inactive.items[0].email, "b@x.in");
    }
}
