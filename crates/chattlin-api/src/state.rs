//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. The version job is generic over store and hub traits; AppState pins
//! it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chattlin_core::analytics::IdentityChannel;
use chattlin_core::storage::KvStore;
use chattlin_core::version::{CURRENT_VERSION, CheckNewVersionsJob, installation_identifier};
use chattlin_infra::config::load_global_config;
use chattlin_infra::hub::HubClient;
use chattlin_infra::memory::MemoryKvStore;
use chattlin_infra::sqlite::pool::{data_dir, database_url};
use chattlin_infra::sqlite::{DatabasePool, SqliteKvStore};
use chattlin_types::config::GlobalConfig;
use chattlin_types::error::RepositoryError;
use chattlin_types::storage::KvEntry;
use chattlin_types::version::InstallationInfo;

/// Store backend selected at startup.
#[derive(Clone)]
pub enum AppStore {
    Sqlite(SqliteKvStore),
    /// Process-local; nothing survives a restart.
    Memory(MemoryKvStore),
}

impl AppStore {
    pub fn backend(&self) -> &'static str {
        match self {
            AppStore::Sqlite(_) => "sqlite",
            AppStore::Memory(_) => "memory",
        }
    }
}

impl KvStore for AppStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        match self {
            AppStore::Sqlite(store) => store.get(key).await,
            AppStore::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        match self {
            AppStore::Sqlite(store) => store.set(key, value).await,
            AppStore::Memory(store) => store.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        match self {
            AppStore::Sqlite(store) => store.delete(key).await,
            AppStore::Memory(store) => store.delete(key).await,
        }
    }

    async fn list_keys(&self) -> Result<Vec<String>, RepositoryError> {
        match self {
            AppStore::Sqlite(store) => store.list_keys().await,
            AppStore::Memory(store) => store.list_keys().await,
        }
    }

    async fn get_entry(&self, key: &str) -> Result<Option<KvEntry>, RepositoryError> {
        match self {
            AppStore::Sqlite(store) => store.get_entry(key).await,
            AppStore::Memory(store) => store.get_entry(key).await,
        }
    }
}

pub type ConcreteVersionJob = CheckNewVersionsJob<AppStore, HubClient>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub kv_store: Arc<AppStore>,
    pub version_job: Arc<ConcreteVersionJob>,
    pub identity: IdentityChannel,
}

impl AppState {
    /// Initialize the application state: load config, open the store, wire
    /// the version job.
    pub async fn init(in_memory: bool) -> anyhow::Result<Self> {
        let data_dir = data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;

        let store = if in_memory {
            AppStore::Memory(MemoryKvStore::new())
        } else {
            let pool = DatabasePool::new(&database_url(&data_dir))
                .await
                .context("failed to open database")?;
            AppStore::Sqlite(SqliteKvStore::new(pool))
        };

        Self::with_store(config, data_dir, store).await
    }

    /// Wire services over an already opened store.
    pub async fn with_store(
        config: GlobalConfig,
        data_dir: PathBuf,
        store: AppStore,
    ) -> anyhow::Result<Self> {
        let identifier =
            installation_identifier(&store, config.hub.installation_identifier.as_deref())
                .await
                .context("failed to resolve installation identifier")?;

        let hub = HubClient::new(
            &config.hub,
            InstallationInfo {
                installation_identifier: identifier,
                installation_version: CURRENT_VERSION.to_string(),
                installation_host: config.hub.installation_host.clone(),
            },
        )?;

        let kv_store = Arc::new(store);
        let version_job = Arc::new(CheckNewVersionsJob::new(
            config.environment,
            kv_store.clone(),
            Arc::new(hub),
        ));

        tracing::debug!(
            environment = %config.environment,
            store = kv_store.backend(),
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            data_dir,
            kv_store,
            version_job,
            identity: IdentityChannel::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chattlin_types::version::INSTALLATION_ID_KEY;

    #[tokio::test]
    async fn test_with_store_generates_and_keeps_installation_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::Memory(MemoryKvStore::new());

        let state = AppState::with_store(GlobalConfig::default(), dir.path().to_path_buf(), store)
            .await
            .unwrap();
        let stored = state.kv_store.get(INSTALLATION_ID_KEY).await.unwrap();
        assert!(stored.as_ref().and_then(|v| v.as_str()).is_some());

        let again = AppState::with_store(
            GlobalConfig::default(),
            dir.path().to_path_buf(),
            (*state.kv_store).clone(),
        )
        .await
        .unwrap();
        assert_eq!(again.kv_store.get(INSTALLATION_ID_KEY).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_sqlite_backend_delegates() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path())).await.unwrap();
        let store = AppStore::Sqlite(SqliteKvStore::new(pool));
        assert_eq!(store.backend(), "sqlite");

        store.set("greeting", &serde_json::json!("hi")).await.unwrap();
        assert_eq!(store.get("greeting").await.unwrap(), Some(serde_json::json!("hi")));
        assert_eq!(store.list_keys().await.unwrap(), vec!["greeting"]);
        store.delete("greeting").await.unwrap();
        assert!(store.get_entry("greeting").await.unwrap().is_none());
    }
}
