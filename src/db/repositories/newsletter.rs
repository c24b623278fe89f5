//! Newsletter subscription repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::NewsletterSubscription;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Lookup by the stored (lowercased) email
    async fn get_by_email(&self, email: &str) -> Result<Option<NewsletterSubscription>>;

    async fn create(&self, email: &str, name: Option<&str>) -> Result<NewsletterSubscription>;

    /// Flip the active flag; a provided name replaces the stored one
    async fn set_active(
        &self,
        id: i64,
        active: bool,
        name: Option<&str>,
    ) -> Result<Option<NewsletterSubscription>>;

    /// Newest first; `active` narrows to subscribed or unsubscribed readers
    async fn list(
        &self,
        active: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<NewsletterSubscription>>;

    async fn count(&self, active: Option<bool>) -> Result<i64>;
}

pub struct SqlxNewsletterRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsletterRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsletterRepository> {
        Arc::new(Self::new(pool))
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: i64,
    email: String,
    name: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for NewsletterSubscription {
    fn from(row: SubscriptionRow) -> Self {
        NewsletterSubscription {
            id: row.id,
            email: row.email,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_SUBSCRIPTION: &str =
    "SELECT id, email, name, is_active, created_at, updated_at FROM newsletter_subscriptions";

fn active_clause(active: Option<bool>) -> &'static str {
    match active {
        Some(_) => " WHERE is_active = ?",
        None => "",
    }
}

#[async_trait]
impl NewsletterRepository for SqlxNewsletterRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<NewsletterSubscription>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_subscription_by_email_sqlite(self.pool.sqlite()?, email).await?
            }
            DatabaseDriver::Mysql => {
                get_subscription_by_email_mysql(self.pool.mysql()?, email).await?
            }
        };
        Ok(row.map(NewsletterSubscription::from))
    }

    async fn create(&self, email: &str, name: Option<&str>) -> Result<NewsletterSubscription> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_subscription_sqlite(self.pool.sqlite()?, email, name).await?
            }
            DatabaseDriver::Mysql => {
                create_subscription_mysql(self.pool.mysql()?, email, name).await?
            }
        };
        self.get_by_id(id)
            .await?
            .context("Subscription vanished after insert")
    }

    async fn set_active(
        &self,
        id: i64,
        active: bool,
        name: Option<&str>,
    ) -> Result<Option<NewsletterSubscription>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_active_sqlite(self.pool.sqlite()?, id, active, name).await?
            }
            DatabaseDriver::Mysql => set_active_mysql(self.pool.mysql()?, id, active, name).await?,
        }
        self.get_by_id(id).await
    }

    async fn list(
        &self,
        active: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<NewsletterSubscription>> {
        let rows = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_subscriptions_sqlite(self.pool.sqlite()?, active, offset, limit).await?
            }
            DatabaseDriver::Mysql => {
                list_subscriptions_mysql(self.pool.mysql()?, active, offset, limit).await?
            }
        };
        Ok(rows.into_iter().map(NewsletterSubscription::from).collect())
    }

    async fn count(&self, active: Option<bool>) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_subscriptions_sqlite(self.pool.sqlite()?, active).await,
            DatabaseDriver::Mysql => count_subscriptions_mysql(self.pool.mysql()?, active).await,
        }
    }
}

impl SqlxNewsletterRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<NewsletterSubscription>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_subscription_by_id_sqlite(self.pool.sqlite()?, id).await?
            }
            DatabaseDriver::Mysql => {
                get_subscription_by_id_mysql(self.pool.mysql()?, id).await?
            }
        };
        Ok(row.map(NewsletterSubscription::from))
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_subscription_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<SubscriptionRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_SUBSCRIPTION);
    sqlx::query_as::<_, SubscriptionRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get newsletter subscription by ID")
}

async fn get_subscription_by_email_sqlite(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<SubscriptionRow>> {
    let sql = format!("{} WHERE email = ?", SELECT_SUBSCRIPTION);
    sqlx::query_as::<_, SubscriptionRow>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get newsletter subscription by email")
}

async fn create_subscription_sqlite(
    pool: &SqlitePool,
    email: &str,
    name: Option<&str>,
) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO newsletter_subscriptions (email, name, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(email)
    .bind(name)
    .bind(true)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create newsletter subscription")?;
    Ok(result.last_insert_rowid())
}

async fn set_active_sqlite(
    pool: &SqlitePool,
    id: i64,
    active: bool,
    name: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "UPDATE newsletter_subscriptions SET is_active = ?, name = COALESCE(?, name), updated_at = ? \
         WHERE id = ?",
    )
    .bind(active)
    .bind(name)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update newsletter subscription")?;
    Ok(())
}

async fn list_subscriptions_sqlite(
    pool: &SqlitePool,
    active: Option<bool>,
    offset: i64,
    limit: i64,
) -> Result<Vec<SubscriptionRow>> {
    let sql = format!(
        "{}{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_SUBSCRIPTION,
        active_clause(active)
    );
    let mut query = sqlx::query_as::<_, SubscriptionRow>(&sql);
    if let Some(active) = active {
        query = query.bind(active);
    }
    query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list newsletter subscriptions")
}

async fn count_subscriptions_sqlite(pool: &SqlitePool, active: Option<bool>) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM newsletter_subscriptions{}",
        active_clause(active)
    );
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(active) = active {
        query = query.bind(active);
    }
    query
        .fetch_one(pool)
        .await
        .context("Failed to count newsletter subscriptions")
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_subscription_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<SubscriptionRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_SUBSCRIPTION);
    sqlx::query_as::<_, SubscriptionRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get newsletter subscription by ID")
}

async fn get_subscription_by_email_mysql(
    pool: &MySqlPool,
    email: &str,
) -> Result<Option<SubscriptionRow>> {
    let sql = format!("{} WHERE email = ?", SELECT_SUBSCRIPTION);
    sqlx::query_as::<_, SubscriptionRow>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get newsletter subscription by email")
}

async fn create_subscription_mysql(
    pool: &MySqlPool,
    email: &str,
    name: Option<&str>,
) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO newsletter_subscriptions (email, name, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(email)
    .bind(name)
    .bind(true)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create newsletter subscription")?;
    Ok(result.last_insert_id() as i64)
}

async fn set_active_mysql(
    pool: &MySqlPool,
    id: i64,
    active: bool,
    name: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "UPDATE newsletter_subscriptions SET is_active = ?, name = COALESCE(?, name), updated_at = ? \
         WHERE id = ?",
    )
    .bind(active)
    .bind(name)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update newsletter subscription")?;
    Ok(())
}

async fn list_subscriptions_mysql(
    pool: &MySqlPool,
    active: Option<bool>,
    offset: i64,
    limit: i64,
) -> Result<Vec<SubscriptionRow>> {
    let sql = format!(
        "{}{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_SUBSCRIPTION,
        active_clause(active)
    );
    let mut query = sqlx::query_as::<_, SubscriptionRow>(&sql);
    if let Some(active) = active {
        query = query.bind(active);
    }
    query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list newsletter subscriptions")
}

async fn count_subscriptions_mysql(pool: &MySqlPool, active: Option<bool>) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM newsletter_subscriptions{}",
        active_clause(active)
    );
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(active) = active {
        query = query.bind(active);
    }
    query
        .fetch_one(pool)
        .await
        .context("Failed to count newsletter subscriptions")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxNewsletterRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxNewsletterRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = setup().await;
        let sub = repo.create("reader@example.in", Some("Ravi")).await.unwrap();
        assert!(sub.is_active);

        let found = repo.get_by_email("reader@example.in").await.unwrap().unwrap();
        assert_eq!(found.id, sub.id);
        assert_eq!(found.name.as_deref(), Some("Ravi"));
        assert!(repo.get_by_email("nobody@example.in").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_schema() {
        let repo = setup().await;
        repo.create("dup@example.in", None).await.unwrap();
        let err = repo.create("dup@example.in", None).await.unwrap_err();
        assert!(crate::db::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_set_active_and_filtered_listing() {
        let repo = setup().await;
        let a = repo.create("a@example.in", None).await.unwrap();
        repo.create("b@example.in", None).await.unwrap();

        let off = repo.set_active(a.id, false, None).await.unwrap().unwrap();
        assert!(!off.is_active);

        assert_eq!(repo.count(None).await.unwrap(), 2);
        assert_eq!(repo.count(Some(true)).await.unwrap(), 1);
        let inactive = repo.list(Some(false), 0, 10).await.unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].email, "a@example.in");

        let back = repo.set_active(a.id, true, Some("Asha")).await.unwrap().unwrap();
        assert!(back.is_active);
        assert_eq!(back.name.as_deref(), Some("Asha"));
    }
}
