//! Release hub HTTP client.
//!
//! The hub keeps a registry of installations. Each check registers this one
//! (`POST {hub_url}/instances`) and the response carries the latest published
//! version.

use std::time::Duration;

use chattlin_core::version::VersionHub;
use chattlin_types::config::HubConfig;
use chattlin_types::error::HubError;
use chattlin_types::version::InstallationInfo;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct InstanceResponse {
    #[serde(default)]
    version: Option<String>,
}

/// [`VersionHub`] over the release hub's REST API.
pub struct HubClient {
    client: reqwest::Client,
    base_url: String,
    info: InstallationInfo,
}

impl HubClient {
    pub fn new(config: &HubConfig, info: InstallationInfo) -> Result<Self, HubError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("chattlin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HubError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            info,
        })
    }

    pub fn instances_url(&self) -> String {
        format!("{}/instances", self.base_url)
    }

    pub fn installation(&self) -> &InstallationInfo {
        &self.info
    }
}

impl VersionHub for HubClient {
    async fn latest_version(&self) -> Result<Option<String>, HubError> {
        let response = self
            .client
            .post(self.instances_url())
            .json(&self.info)
            .send()
            .await
            .map_err(|e| HubError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Status(status.as_u16()));
        }

        let body: InstanceResponse = response
            .json()
            .await
            .map_err(|e| HubError::InvalidResponse(e.to_string()))?;
        tracing::debug!(version = ?body.version, "hub responded");
        Ok(body.version)
    }
}
