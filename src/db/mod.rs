//! Database layer
//!
//! SQLite is the default backend for single-binary deployments; MySQL is
//! available for larger newsrooms. The driver is picked from configuration
//! and hidden behind the `DatabasePool` trait, so repositories dispatch on
//! `pool.driver()` and borrow the concrete sqlx pool they need.
//!
//! ```ignore
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};

/// Whether a repository error was caused by a UNIQUE constraint.
///
/// Lets services turn an insert that lost a race against a duplicate into
/// the same conflict they report for an up-front duplicate check.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db)) if db.is_unique_violation()
        )
    })
}
