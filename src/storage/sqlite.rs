use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::debug;

use super::jobs::SqliteJobStore;
use super::skills::SqliteSkillStore;
use super::traits::StorageResult;
use super::users::SqliteUserStore;

/// Open a SQLite pool, creating the database file if needed.
///
/// In-memory databases live as long as their connection, so they get a single
/// connection that is never recycled.
pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    debug!(in_memory, "Opening SQLite pool for {}", database_url);
    Ok(pool_options.connect_with(options).await?)
}

/// Create every table, parents before children
pub async fn initialize_schema(pool: &SqlitePool) -> StorageResult<()> {
    SqliteSkillStore::new(pool.clone()).initialize().await?;
    SqliteUserStore::new(pool.clone()).initialize().await?;
    SqliteJobStore::new(pool.clone()).initialize().await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:", 1).await.unwrap();
    initialize_schema(&pool).await.unwrap();
    pool
}
