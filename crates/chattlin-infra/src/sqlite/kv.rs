//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `chattlin-core` using sqlx with split read/write pools.
//! Values are stored as JSON text and deserialized on read.

use chattlin_core::storage::KvStore;
use chattlin_types::error::RepositoryError;
use chattlin_types::storage::KvEntry;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct KvRow {
    key: String,
    value: String,
    created_at: String,
    updated_at: String,
}

impl KvRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            key: row.try_get("key")?,
            value: row.try_get("value")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_entry(self) -> Result<KvEntry, RepositoryError> {
        Ok(KvEntry {
            value: parse_value(&self.value)?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            key: self.key,
        })
    }
}

fn parse_value(s: &str) -> Result<serde_json::Value, RepositoryError> {
    serde_json::from_str(s).map_err(|e| RepositoryError::Query(format!("invalid JSON value: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let value: String = row.try_get("value").map_err(query_error)?;
                Ok(Some(parse_value(&value)?))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize value: {e}")))?;

        sqlx::query(
            r#"INSERT INTO kv_store (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        tracing::debug!(key, "kv value stored");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("key").map_err(query_error))
            .collect()
    }

    async fn get_entry(&self, key: &str) -> Result<Option<KvEntry>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let kv_row = KvRow::from_row(&row).map_err(query_error)?;
                Ok(Some(kv_row.into_entry()?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::database_url;

    async fn test_store() -> (tempfile::TempDir, SqliteKvStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path())).await.unwrap();
        (dir, SqliteKvStore::new(pool))
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let (_dir, store) = test_store().await;
        store
            .set("LATEST_CHATTLIN_VERSION", &serde_json::json!("1.1.1"))
            .await
            .unwrap();

        let got = store.get("LATEST_CHATTLIN_VERSION").await.unwrap();
        assert_eq!(got, Some(serde_json::json!("1.1.1")));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let (_dir, store) = test_store().await;
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_upserts_and_keeps_created_at() {
        let (_dir, store) = test_store().await;
        store.set("counter", &serde_json::json!(1)).await.unwrap();
        let first = store.get_entry("counter").await.unwrap().unwrap();

        store.set("counter", &serde_json::json!(2)).await.unwrap();
        let second = store.get_entry("counter").await.unwrap().unwrap();

        assert_eq!(second.value, serde_json::json!(2));
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store) = test_store().await;
        store.set("temp", &serde_json::json!("value")).await.unwrap();
        store.delete("temp").await.unwrap();
        assert!(store.get("temp").await.unwrap().is_none());

        // Deleting again is a no-op.
        store.delete("temp").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_keys_sorted() {
        let (_dir, store) = test_store().await;
        assert!(store.list_keys().await.unwrap().is_empty());

        for key in ["beta", "alpha", "gamma"] {
            store.set(key, &serde_json::json!(key)).await.unwrap();
        }
        assert_eq!(store.list_keys().await.unwrap(), vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_json_value_types() {
        let (_dir, store) = test_store().await;
        for (key, value) in [
            ("string", serde_json::json!("hello")),
            ("number", serde_json::json!(42)),
            ("null", serde_json::json!(null)),
            ("nested", serde_json::json!({"a": {"b": [1, "two"]}})),
        ] {
            store.set(key, &value).await.unwrap();
            assert_eq!(store.get(key).await.unwrap(), Some(value));
        }
    }
}
