//! Key-value store trait.
//!
//! Defines the interface for the installation-wide key-value store that
//! holds values such as the latest released version.

use chattlin_types::error::RepositoryError;
use chattlin_types::storage::KvEntry;

/// Trait for installation-wide key-value persistent storage.
///
/// Stores arbitrary JSON values keyed by string.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in chattlin-infra.
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, RepositoryError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(&self, key: &str)
    -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List all keys, sorted.
    fn list_keys(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    /// Get the full entry including timestamps.
    fn get_entry(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<KvEntry>, RepositoryError>> + Send;
}
