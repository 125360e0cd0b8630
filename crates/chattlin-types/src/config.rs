//! Global configuration types for Chattlin.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! deployment environment, the release hub, the version-check schedule and
//! the analytics integration.

use serde::{Deserialize, Serialize};

use crate::version::Environment;

/// Top-level configuration for the Chattlin services.
///
/// Loaded from `~/.chattlin/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Deployment environment. The version check only runs in production.
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub hub: HubConfig,

    #[serde(default)]
    pub version_check: VersionCheckConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Release hub connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_hub_url")]
    pub url: String,
    #[serde(default = "default_hub_timeout_secs")]
    pub timeout_secs: u64,
    /// Stable identifier of this installation. Generated on first start when
    /// absent.
    #[serde(default)]
    pub installation_identifier: Option<String>,
    /// Public host name reported to the hub.
    #[serde(default = "default_installation_host")]
    pub installation_host: String,
}

fn default_hub_url() -> String {
    "https://hub.chattlin.com".to_string()
}

fn default_hub_timeout_secs() -> u64 {
    10
}

fn default_installation_host() -> String {
    "localhost".to_string()
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: default_hub_url(),
            timeout_secs: default_hub_timeout_secs(),
            installation_identifier: None,
            installation_host: default_installation_host(),
        }
    }
}

/// Scheduling of the version-check job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionCheckConfig {
    /// Cron expression or human-readable schedule ("every 12 hours").
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Run a catch-up check on start when a scheduled run was missed.
    #[serde(default = "default_true")]
    pub catch_up: bool,
}

fn default_schedule() -> String {
    "every 12 hours".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for VersionCheckConfig {
    fn default() -> Self {
        Self {
            schedule: default_schedule(),
            catch_up: true,
        }
    }
}

/// Product-analytics integration. Disabled unless `api_key` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_host")]
    pub api_host: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_analytics_host() -> String {
    "https://app.posthog.com".to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            api_host: default_analytics_host(),
            api_key: None,
        }
    }
}

impl AnalyticsConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// REST server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.hub.url, "https://hub.chattlin.com");
        assert_eq!(config.version_check.schedule, "every 12 hours");
        assert!(config.version_check.catch_up);
        assert!(!config.analytics.is_enabled());
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.hub.timeout_secs, 10);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
environment = "production"

[hub]
url = "https://hub.internal"
installation_identifier = "inst-1"

[version_check]
schedule = "0 0 3 * * *"
catch_up = false

[analytics]
api_key = "phc_123"

[server]
port = 8080
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert!(config.environment.is_production());
        assert_eq!(config.hub.url, "https://hub.internal");
        assert_eq!(config.hub.installation_identifier.as_deref(), Some("inst-1"));
        assert_eq!(config.version_check.schedule, "0 0 3 * * *");
        assert!(!config.version_check.catch_up);
        assert!(config.analytics.is_enabled());
        assert_eq!(config.analytics.api_host, "https://app.posthog.com");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_empty_analytics_key_is_disabled() {
        let config = AnalyticsConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.is_enabled());
    }
}
