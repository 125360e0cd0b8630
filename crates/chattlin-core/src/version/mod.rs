//! Release version tracking.
//!
//! [`CheckNewVersionsJob`] asks the release hub for the latest published
//! version and records it in the key-value store. [`CronScheduler`] runs it
//! periodically. [`VersionStatus`] compares the stored value against the
//! running build for the dashboard's update notice.

pub mod hub;
pub mod job;
pub mod scheduler;

pub use hub::VersionHub;
pub use job::CheckNewVersionsJob;
pub use scheduler::{CronCallback, CronScheduler, SchedulerError, normalize_schedule};

use chattlin_types::error::RepositoryError;
use chattlin_types::version::INSTALLATION_ID_KEY;
use serde::Serialize;

use crate::storage::KvStore;

/// Version of the running build.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Running version against the latest one the hub reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionStatus {
    pub current: String,
    pub latest: Option<String>,
    pub update_available: bool,
}

impl VersionStatus {
    pub fn new(current: impl Into<String>, latest: Option<String>) -> Self {
        let current = current.into();
        let update_available = latest
            .as_deref()
            .is_some_and(|latest| is_newer(latest, &current));
        Self {
            current,
            latest,
            update_available,
        }
    }
}

/// Whether `candidate` is a strictly newer semver than `current`.
///
/// A leading `v` is accepted. Anything that does not parse is never newer.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let parse = |s: &str| semver::Version::parse(s.trim().trim_start_matches('v')).ok();
    match (parse(candidate), parse(current)) {
        (Some(candidate), Some(current)) => candidate > current,
        _ => false,
    }
}

/// The installation identifier: `configured` when set, else the one stored
/// by an earlier start, else a fresh UUID that is stored for next time.
pub async fn installation_identifier<K: KvStore>(
    store: &K,
    configured: Option<&str>,
) -> Result<String, RepositoryError> {
    if let Some(id) = configured.filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }
    if let Some(id) = store
        .get(INSTALLATION_ID_KEY)
        .await?
        .and_then(|v| v.as_str().map(str::to_string))
    {
        return Ok(id);
    }
    let id = uuid::Uuid::now_v7().to_string();
    store
        .set(INSTALLATION_ID_KEY, &serde_json::Value::String(id.clone()))
        .await?;
    tracing::info!(installation_identifier = %id, "generated installation identifier");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_newer() {
        assert!(is_newer("1.1.1", "1.1.0"));
        assert!(is_newer("v2.0.0", "1.9.9"));
        assert!(!is_newer("1.1.0", "1.1.0"));
        assert!(!is_newer("1.0.9", "1.1.0"));
        assert!(!is_newer("1.2.0-rc.1", "1.2.0"));
        assert!(!is_newer("garbage", "1.0.0"));
    }

    #[test]
    fn test_status_without_latest() {
        let status = VersionStatus::new("0.1.0", None);
        assert!(!status.update_available);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["current"], "0.1.0");
        assert!(json["latest"].is_null());
    }

    #[test]
    fn test_status_with_newer_latest() {
        let status = VersionStatus::new("0.1.0", Some("0.2.0".to_string()));
        assert!(status.update_available);
    }
}
