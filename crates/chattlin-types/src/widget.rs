//! Widget configuration types.
//!
//! `WidgetConfig` is the host page's description of the widget: where the
//! frame is served from, which website inbox it belongs to, and how the
//! launcher is laid out. It is deserialized from the camelCase settings object
//! the host page passes to the loader.

use serde::{Deserialize, Serialize};

/// DOM id of the embedded widget frame. At most one exists per page.
pub const FRAME_ELEMENT_ID: &str = "chattlin_live_chat_widget";

/// Window event dispatched on the host page once the frame reports `loaded`.
pub const READY_EVENT: &str = "chattlin:ready";

/// Telemetry event pushed to the frame when the widget is opened.
pub const TRIGGERED_EVENT: &str = "webwidget.triggered";

/// Which side of the viewport the launcher and frame are anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    #[default]
    Right,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Right => "right",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Position::Left),
            "right" => Ok(Position::Right),
            other => Err(format!("invalid widget position: '{other}'")),
        }
    }
}

/// Host-supplied widget settings. Immutable once the widget is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Origin serving the widget frame, without a trailing slash.
    pub base_url: String,
    pub website_token: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub hide_message_bubble: bool,
    #[serde(default)]
    pub show_popout_button: bool,
    /// Overrides any label the frame asks the bubble to show.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launcher_title: Option<String>,
}

fn default_locale() -> String {
    "en".to_string()
}

impl WidgetConfig {
    pub fn new(base_url: impl Into<String>, website_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            website_token: website_token.into(),
            position: Position::default(),
            locale: default_locale(),
            hide_message_bubble: false,
            show_popout_button: false,
            launcher_title: None,
        }
    }
}

/// A visitor identity the host page hands to the widget.
///
/// Sent verbatim as the `set-user` payload; unknown keys supplied by the host
/// are carried through in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetUser {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// HMAC of the identifier, used by the frame to verify the identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_hash: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
