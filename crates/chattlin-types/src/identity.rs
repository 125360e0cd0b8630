//! Identity signals shared between the dashboard, the analytics bridge and
//! the support widget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::widget::WidgetUser;

/// The signed-in dashboard user whose identity is forwarded to third parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// HMAC of the user's identifier, issued by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DashboardUser {
    /// Identity handed to the support widget. The email doubles as the
    /// widget identifier.
    pub fn to_widget_user(&self) -> WidgetUser {
        WidgetUser {
            identifier: self.email.clone(),
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            avatar_url: self.avatar_url.clone(),
            identifier_hash: self.hmac_identifier.clone(),
            extra: serde_json::Map::new(),
        }
    }

    /// Custom attributes attached to the support widget contact.
    pub fn widget_attributes(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut attrs = serde_json::Map::new();
        if let Some(created_at) = self.created_at {
            attrs.insert(
                "signedUpAt".to_string(),
                serde_json::Value::String(created_at.to_rfc3339()),
            );
        }
        attrs.insert(
            "cloudCustomer".to_string(),
            serde_json::Value::String("true".to_string()),
        );
        attrs
    }
}

/// Identity changes broadcast to analytics and support integrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IdentitySignal {
    /// A user signed in or their profile was loaded.
    Identify { user: DashboardUser },
    /// The user signed out; integrations must forget the identity.
    Reset,
}
