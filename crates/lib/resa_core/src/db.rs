//! SQLite connection pool management.
//!
//! Provides pool construction from [`ResaConfig`] and an in-memory pool for
//! tests and throwaway runs.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

use crate::config::ResaConfig;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory database URL.
const MEMORY_URL: &str = "sqlite::memory:";

/// Opens a transaction that takes the write lock up front. Use it for
/// read-then-write sequences: a deferred transaction that later upgrades to a
/// writer fails with `SQLITE_BUSY` instead of waiting on the busy timeout.
pub const BEGIN_IMMEDIATE: &str = "BEGIN IMMEDIATE";

/// Errors that can occur while opening the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

fn connect_options(url: &str) -> Result<SqliteConnectOptions> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    Ok(options)
}

/// Open a connection pool for the configured database.
///
/// The database file is created if missing. Foreign keys are enforced on
/// every connection.
pub async fn connect(config: &ResaConfig) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options(&config.database_url)?)
        .await?;
    info!(
        database_url = %config.database_url,
        max_connections = config.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Open a single-connection in-memory pool with the schema already created.
///
/// Each in-memory SQLite connection is its own database, so the pool is
/// pinned to one connection that never expires.
pub async fn ephemeral_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options(MEMORY_URL)?)
        .await?;
    crate::schema::reset_schema(&pool).await?;
    Ok(pool)
}
