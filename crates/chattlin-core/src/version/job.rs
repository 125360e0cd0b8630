//! Scheduled version check.

use std::sync::Arc;

use chattlin_types::error::{JobError, RepositoryError};
use chattlin_types::version::{
    Environment, LAST_CHECK_KEY, LATEST_VERSION_KEY, SkipReason, VersionCheckOutcome,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::hub::VersionHub;
use crate::storage::KvStore;

/// Fetches the latest release from the hub and records it in the store.
///
/// Only production deployments report to the hub. A hub that is unreachable
/// or answers without a version ends the run quietly without writing to the
/// store; a store that cannot be written fails it.
pub struct CheckNewVersionsJob<K, H> {
    environment: Environment,
    store: Arc<K>,
    hub: Arc<H>,
}

impl<K: KvStore, H: VersionHub> CheckNewVersionsJob<K, H> {
    pub fn new(environment: Environment, store: Arc<K>, hub: Arc<H>) -> Self {
        Self {
            environment,
            store,
            hub,
        }
    }

    pub async fn perform(&self) -> Result<VersionCheckOutcome, JobError> {
        if !self.environment.is_production() {
            debug!(environment = %self.environment, "version check skipped outside production");
            return Ok(VersionCheckOutcome::Skipped {
                reason: SkipReason::NonProduction,
            });
        }

        let latest = match self.hub.latest_version().await {
            Ok(version) => version.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "version hub request failed");
                None
            }
        };

        let Some(version) = latest else {
            info!("version hub reported no version");
            return Ok(VersionCheckOutcome::Skipped {
                reason: SkipReason::NoUpstreamVersion,
            });
        };

        self.store
            .set(LATEST_VERSION_KEY, &serde_json::Value::String(version.clone()))
            .await?;
        self.record_check().await;

        info!(%version, "latest version recorded");
        Ok(VersionCheckOutcome::Stored { version })
    }

    /// When a run last recorded a version, if ever.
    pub async fn last_checked_at(&self) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let value = self.store.get(LAST_CHECK_KEY).await?;
        Ok(value
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc)))
    }

    /// The latest version recorded by a previous run.
    pub async fn latest_recorded(&self) -> Result<Option<String>, RepositoryError> {
        let value = self.store.get(LATEST_VERSION_KEY).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }

    // Bookkeeping for missed-run catch-up, written only alongside a stored
    // version. A failed write only costs one extra run after restart.
    async fn record_check(&self) {
        let now = serde_json::Value::String(Utc::now().to_rfc3339());
        if let Err(e) = self.store.set(LAST_CHECK_KEY, &now).await {
            warn!(error = %e, "failed to record version check time");
        }
    }
}
