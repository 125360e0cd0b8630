//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. This module provides a `DatabasePool`
//! with a multi-connection reader pool for concurrent reads and a single-connection
//! writer pool for serialized writes. Both use WAL journal mode.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE/DELETE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Create a new DatabasePool with split reader/writer connections.
    ///
    /// Runs migrations on the writer pool before the reader pool opens.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(base_opts)
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        tracing::debug!(url = database_url, "database pool ready");
        Ok(Self { reader, writer })
    }
}

/// The data directory: `CHATTLIN_DATA_DIR` if set, else `~/.chattlin`.
pub fn data_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var("CHATTLIN_DATA_DIR") {
        return dir.into();
    }
    dirs::home_dir()
        .unwrap_or_else(|| ".".into())
        .join(".chattlin")
}

/// SQLite URL for `chattlin.db` inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("chattlin.db").display())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool_in(dir: &tempfile::TempDir) -> DatabasePool {
        DatabasePool::new(&database_url(dir.path())).await.unwrap()
    }

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let pool = pool_in(&dir).await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(table_names, vec!["kv_store"]);
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let pool = pool_in(&dir).await;

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_pool_reopens_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let first = pool_in(&dir).await;
        sqlx::query("INSERT INTO kv_store (key, value, created_at, updated_at) VALUES ('a', '1', 'x', 'x')")
            .execute(&first.writer)
            .await
            .unwrap();
        drop(first);

        let second = pool_in(&dir).await;
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&second.reader)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[test]
    fn test_database_url() {
        let url = database_url(Path::new("/tmp/chattlin"));
        assert_eq!(url, "sqlite:///tmp/chattlin/chattlin.db?mode=rwc");
    }
}
