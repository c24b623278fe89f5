//! User repository
//!
//! Database operations for newsroom user profiles.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateUserInput, User, UserRole, UserStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user with an already hashed password.
    ///
    /// The first account becomes admin and every later one a reader. The
    /// role is picked by the insert itself, so racing first sign-ups cannot
    /// both end up admin.
    async fn create(&self, input: &CreateUserInput, password_hash: &str) -> Result<User>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Newest first
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>>;

    async fn count(&self) -> Result<i64>;

    /// Change role and status; returns `None` when the user does not exist
    async fn update_access(&self, id: i64, role: UserRole, status: UserStatus)
        -> Result<Option<User>>;
}

/// SQLx-based user repository for SQLite and MySQL
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, full_name, password_hash, role, status, created_at, updated_at)
    SELECT ?, ?, ?, ?, CASE WHEN EXISTS (SELECT 1 FROM users) THEN ? ELSE ? END, ?, ?, ?
"#;

const SELECT_USER: &str = r#"
    SELECT id, username, email, full_name, password_hash, role, status, created_at, updated_at
    FROM users
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    full_name: Option<String>,
    password_hash: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_user(row: Option<UserRow>) -> Result<Option<User>> {
    row.map(User::try_from).transpose()
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput, password_hash: &str) -> Result<User> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_user_sqlite(self.pool.sqlite()?, input, password_hash).await?
            }
            DatabaseDriver::Mysql => {
                create_user_mysql(self.pool.mysql()?, input, password_hash).await?
            }
        };
        self.get_by_id(id)
            .await?
            .context("User vanished after insert")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => get_user_by_id_sqlite(self.pool.sqlite()?, id).await?,
            DatabaseDriver::Mysql => get_user_by_id_mysql(self.pool.mysql()?, id).await?,
        };
        into_user(row)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE username = ?", SELECT_USER);
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => fetch_user_sqlite(self.pool.sqlite()?, &sql, username).await?,
            DatabaseDriver::Mysql => fetch_user_mysql(self.pool.mysql()?, &sql, username).await?,
        };
        into_user(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE LOWER(email) = LOWER(?)", SELECT_USER);
        let row = match self.pool.driver() {
            DatabaseDriver::Sqlite => fetch_user_sqlite(self.pool.sqlite()?, &sql, email).await?,
            DatabaseDriver::Mysql => fetch_user_mysql(self.pool.mysql()?, &sql, email).await?,
        };
        into_user(row)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
        let rows = match self.pool.driver() {
            DatabaseDriver::Sqlite => list_users_sqlite(self.pool.sqlite()?, offset, limit).await?,
            DatabaseDriver::Mysql => list_users_mysql(self.pool.mysql()?, offset, limit).await?,
        };
        rows.into_iter().map(User::try_from).collect()
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_users_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => count_users_mysql(self.pool.mysql()?).await,
        }
    }

    async fn update_access(
        &self,
        id: i64,
        role: UserRole,
        status: UserStatus,
    ) -> Result<Option<User>> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_access_sqlite(self.pool.sqlite()?, id, role, status).await?
            }
            DatabaseDriver::Mysql => {
                update_access_mysql(self.pool.mysql()?, id, role, status).await?
            }
        };
        if affected == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(
    pool: &SqlitePool,
    input: &CreateUserInput,
    password_hash: &str,
) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(INSERT_USER)
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(password_hash)
        .bind(UserRole::Reader.as_str())
        .bind(UserRole::Admin.as_str())
        .bind(UserStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(result.last_insert_rowid())
}

async fn get_user_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_USER);
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by id")
}

async fn fetch_user_sqlite(pool: &SqlitePool, sql: &str, key: &str) -> Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(sql)
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("Failed to get user")
}

async fn list_users_sqlite(pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<UserRow>> {
    let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?", SELECT_USER);
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list users")
}

async fn count_users_sqlite(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(count)
}

async fn update_access_sqlite(
    pool: &SqlitePool,
    id: i64,
    role: UserRole,
    status: UserStatus,
) -> Result<u64> {
    let result = sqlx::query("UPDATE users SET role = ?, status = ?, updated_at = ? WHERE id = ?")
        .bind(role.as_str())
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update user")?;
    Ok(result.rows_affected())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(
    pool: &MySqlPool,
    input: &CreateUserInput,
    password_hash: &str,
) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(INSERT_USER)
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(password_hash)
        .bind(UserRole::Reader.as_str())
        .bind(UserRole::Admin.as_str())
        .bind(UserStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(result.last_insert_id() as i64)
}

async fn get_user_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("{} WHERE id = ?", SELECT_USER);
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by id")
}

async fn fetch_user_mysql(pool: &MySqlPool, sql: &str, key: &str) -> Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(sql)
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("Failed to get user")
}

async fn list_users_mysql(pool: &MySqlPool, offset: i64, limit: i64) -> Result<Vec<UserRow>> {
    let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?", SELECT_USER);
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list users")
}

async fn count_users_mysql(pool: &MySqlPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(count)
}

async fn update_access_mysql(
    pool: &MySqlPool,
    id: i64,
    role: UserRole,
    status: UserStatus,
) -> Result<u64> {
    let result = sqlx::query("UPDATE users SET role = ?, status = ?, updated_at = ? WHERE id = ?")
        .bind(role.as_str())
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update user")?;
    Ok(result.rows_affected())
}
