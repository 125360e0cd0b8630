//! Global configuration loader for Chattlin.
//!
//! Reads `config.toml` from the data directory (`~/.chattlin/` by default)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed. `CHATTLIN_*` environment variables override
//! individual settings.

use std::path::Path;

use chattlin_types::config::GlobalConfig;
use chattlin_types::version::Environment;

pub const ENV_ENVIRONMENT: &str = "CHATTLIN_ENV";
pub const ENV_HUB_URL: &str = "CHATTLIN_HUB_URL";
pub const ENV_ANALYTICS_KEY: &str = "CHATTLIN_ANALYTICS_KEY";

/// Load global configuration from `{data_dir}/config.toml`, then apply
/// environment overrides.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config = read_config_file(data_dir).await;
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

async fn read_config_file(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Apply `CHATTLIN_ENV`, `CHATTLIN_HUB_URL` and `CHATTLIN_ANALYTICS_KEY`
/// looked up through `var`. Empty values are ignored; an unknown environment
/// name is ignored with a warning.
pub fn apply_env_overrides(
    mut config: GlobalConfig,
    var: impl Fn(&str) -> Option<String>,
) -> GlobalConfig {
    let lookup = |name: &str| var(name).filter(|v| !v.trim().is_empty());

    if let Some(env) = lookup(ENV_ENVIRONMENT) {
        match env.parse::<Environment>() {
            Ok(environment) => config.environment = environment,
            Err(e) => tracing::warn!("Ignoring {ENV_ENVIRONMENT}: {e}"),
        }
    }
    if let Some(url) = lookup(ENV_HUB_URL) {
        config.hub.url = url;
    }
    if let Some(key) = lookup(ENV_ANALYTICS_KEY) {
        config.analytics.api_key = Some(key);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_file(tmp.path()).await;
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.version_check.schedule, "every 12 hours");
    }

    #[tokio::test]
    async fn valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
environment = "production"

[hub]
url = "https://hub.internal"
installation_host = "chat.acme.io"

[version_check]
schedule = "daily"
"#,
        )
        .await
        .unwrap();

        let config = read_config_file(tmp.path()).await;
        assert!(config.environment.is_production());
        assert_eq!(config.hub.url, "https://hub.internal");
        assert_eq!(config.hub.installation_host, "chat.acme.io");
        assert_eq!(config.hub.timeout_secs, 10);
        assert_eq!(config.version_check.schedule, "daily");
    }

    #[tokio::test]
    async fn invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = read_config_file(tmp.path()).await;
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn env_overrides_apply() {
        let config = apply_env_overrides(
            GlobalConfig::default(),
            vars(&[
                (ENV_ENVIRONMENT, "prod"),
                (ENV_HUB_URL, "http://localhost:9000"),
                (ENV_ANALYTICS_KEY, "phc_123"),
            ]),
        );
        assert!(config.environment.is_production());
        assert_eq!(config.hub.url, "http://localhost:9000");
        assert!(config.analytics.is_enabled());
    }

    #[test]
    fn empty_and_unknown_overrides_are_ignored() {
        let config = apply_env_overrides(
            GlobalConfig::default(),
            vars(&[(ENV_ENVIRONMENT, "moon"), (ENV_HUB_URL, "  ")]),
        );
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.hub.url, "https://hub.chattlin.com");
        assert!(!config.analytics.is_enabled());
    }
}
