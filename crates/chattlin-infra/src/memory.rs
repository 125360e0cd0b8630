//! In-memory key-value store.
//!
//! Backs `chattlin serve --in-memory` and tests. Contents are lost on drop.

use std::sync::Arc;

use chattlin_core::storage::KvStore;
use chattlin_types::error::RepositoryError;
use chattlin_types::storage::KvEntry;
use chrono::Utc;
use dashmap::DashMap;

/// `KvStore` over a concurrent map. Clones share storage.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, KvEntry>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        Ok(self.entries.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let now = Utc::now();
        self.entries
            .entry(key.to_string())
            .and_modify(|e| {
                e.value = value.clone();
                e.updated_at = now;
            })
            .or_insert_with(|| KvEntry {
                key: key.to_string(),
                value: value.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, RepositoryError> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }

    async fn get_entry(&self, key: &str) -> Result<Option<KvEntry>, RepositoryError> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }
}
