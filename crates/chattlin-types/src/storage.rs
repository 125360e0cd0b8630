//! Key-value store entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the installation-wide key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KvEntry {
    /// The value as a plain string, when it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}
