//! Version-check types.
//!
//! The deployment periodically asks the release hub for the latest published
//! version and records it in the shared key-value store, where the dashboard
//! reads it to show an update notice.

use serde::{Deserialize, Serialize};

/// Store key holding the latest version reported by the hub.
pub const LATEST_VERSION_KEY: &str = "LATEST_CHATTLIN_VERSION";

/// Store key holding the RFC 3339 timestamp of the last run that stored a version.
pub const LAST_CHECK_KEY: &str = "LAST_VERSION_CHECK_AT";

/// Store key holding the generated installation identifier.
pub const INSTALLATION_ID_KEY: &str = "INSTALLATION_IDENTIFIER";

/// Deployment environment the services run in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment: '{other}'")),
        }
    }
}

/// Why a version check finished without writing to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NonProduction,
    NoUpstreamVersion,
}

/// Result of one version-check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VersionCheckOutcome {
    Skipped { reason: SkipReason },
    Stored { version: String },
}

/// Payload sent to the hub describing this installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationInfo {
    pub installation_identifier: String,
    pub installation_version: String,
    pub installation_host: String,
}
