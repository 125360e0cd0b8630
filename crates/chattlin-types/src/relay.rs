//! Host/frame relay messages.
//!
//! The host page and the embedded widget frame talk over the browser's
//! cross-window messaging channel. Every message is a string: the
//! [`RELAY_MARKER`] followed by a JSON object whose `event` field names the
//! message and whose `version` field carries the schema version.
//!
//! Both directions are modelled as internally tagged enums so that handling
//! code matches exhaustively instead of looking handlers up by name.

use serde::{Deserialize, Serialize};

use crate::widget::{Position, WidgetUser};

/// Prefix that marks a cross-window string as a relay message.
pub const RELAY_MARKER: &str = "chattlin-widget:";

/// Highest relay schema version this runtime understands. Messages without a
/// `version` field are treated as version 1.
pub const RELAY_SCHEMA_VERSION: u32 = 1;

/// Messages posted from the host page into the widget frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    /// Display settings pushed once the frame has loaded.
    ConfigSet {
        locale: String,
        position: Position,
        hide_message_bubble: bool,
        show_popout_button: bool,
    },
    SetUser(WidgetUser),
    SetCustomAttributes {
        custom_attributes: serde_json::Map<String, serde_json::Value>,
    },
    ToggleOpen {
        is_open: bool,
    },
    SetUnreadView,
    UnsetUnreadView,
    PushEvent {
        event_name: String,
    },
    ChangeUrl {
        #[serde(rename = "referrerURL")]
        referrer_url: String,
        referrer_host: String,
    },
    ToggleCloseButton {
        show_close: bool,
    },
}

impl OutboundMessage {
    /// Wire tag of this message.
    pub fn tag(&self) -> &'static str {
        match self {
            OutboundMessage::ConfigSet { .. } => "config-set",
            OutboundMessage::SetUser(_) => "set-user",
            OutboundMessage::SetCustomAttributes { .. } => "set-custom-attributes",
            OutboundMessage::ToggleOpen { .. } => "toggle-open",
            OutboundMessage::SetUnreadView => "set-unread-view",
            OutboundMessage::UnsetUnreadView => "unset-unread-view",
            OutboundMessage::PushEvent { .. } => "push-event",
            OutboundMessage::ChangeUrl { .. } => "change-url",
            OutboundMessage::ToggleCloseButton { .. } => "toggle-close-button",
        }
    }
}

/// Requested bubble state carried by `toggleBubble`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleState {
    Open,
    Close,
}

/// Channel settings the frame reports on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    #[serde(default)]
    pub widget_color: Option<String>,
}

/// Payload of the `loaded` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedConfig {
    /// Conversation token to persist in the session cookie.
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub channel_config: ChannelConfig,
}

/// Messages posted from the widget frame to the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    Loaded {
        config: LoadedConfig,
    },
    SetBubbleLabel {
        #[serde(default)]
        label: String,
    },
    ToggleBubble {
        #[serde(default)]
        state: Option<BubbleState>,
    },
    /// A missing `isOpen` reads as closed.
    OnBubbleToggle {
        #[serde(default)]
        is_open: bool,
    },
    OnLocationChange {
        #[serde(rename = "referrerURL")]
        referrer_url: String,
        referrer_host: String,
    },
    SetUnreadMode {
        #[serde(default)]
        unread_message_count: u32,
    },
    SetCampaignMode,
    UpdateIframeHeight {
        #[serde(default)]
        extra_height: Option<f64>,
        #[serde(default)]
        is_fixed_height: bool,
    },
    ResetUnreadMode,
    RemoveUnreadClass,
    CloseChat,
}

impl InboundMessage {
    /// Every tag the host knows how to dispatch.
    pub const TAGS: [&'static str; 11] = [
        "loaded",
        "setBubbleLabel",
        "toggleBubble",
        "onBubbleToggle",
        "onLocationChange",
        "setUnreadMode",
        "setCampaignMode",
        "updateIframeHeight",
        "resetUnreadMode",
        "removeUnreadClass",
        "closeChat",
    ];

    pub fn is_known_tag(tag: &str) -> bool {
        Self::TAGS.contains(&tag)
    }

    /// Wire tag of this message.
    pub fn tag(&self) -> &'static str {
        match self {
            InboundMessage::Loaded { .. } => "loaded",
            InboundMessage::SetBubbleLabel { .. } => "setBubbleLabel",
            InboundMessage::ToggleBubble { .. } => "toggleBubble",
            InboundMessage::OnBubbleToggle { .. } => "onBubbleToggle",
            InboundMessage::OnLocationChange { .. } => "onLocationChange",
            InboundMessage::SetUnreadMode { .. } => "setUnreadMode",
            InboundMessage::SetCampaignMode => "setCampaignMode",
            InboundMessage::UpdateIframeHeight { .. } => "updateIframeHeight",
            InboundMessage::ResetUnreadMode => "resetUnreadMode",
            InboundMessage::RemoveUnreadClass => "removeUnreadClass",
            InboundMessage::CloseChat => "closeChat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outbound_tags_match_serialized_event() {
        let messages = vec![
            OutboundMessage::ConfigSet {
                locale: "en".to_string(),
                position: Position::Left,
                hide_message_bubble: false,
                show_popout_button: true,
            },
            OutboundMessage::SetUser(WidgetUser {
                identifier: "u-1".to_string(),
                ..Default::default()
            }),
            OutboundMessage::SetCustomAttributes {
                custom_attributes: serde_json::Map::new(),
            },
            OutboundMessage::ToggleOpen { is_open: true },
            OutboundMessage::SetUnreadView,
            OutboundMessage::UnsetUnreadView,
            OutboundMessage::PushEvent {
                event_name: "webwidget.triggered".to_string(),
            },
            OutboundMessage::ChangeUrl {
                referrer_url: "https://host/a".to_string(),
                referrer_host: "host".to_string(),
            },
            OutboundMessage::ToggleCloseButton { show_close: false },
        ];
        for msg in messages {
            let value = serde_json::to_value(&msg).unwrap();
            assert_eq!(value["event"], msg.tag());
        }
    }

    #[test]
    fn test_config_set_field_names() {
        let msg = OutboundMessage::ConfigSet {
            locale: "de".to_string(),
            position: Position::Right,
            hide_message_bubble: true,
            show_popout_button: false,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "config-set",
                "locale": "de",
                "position": "right",
                "hideMessageBubble": true,
                "showPopoutButton": false,
            })
        );
    }

    #[test]
    fn test_change_url_uses_uppercase_url_key() {
        let msg = OutboundMessage::ChangeUrl {
            referrer_url: "https://host/page".to_string(),
            referrer_host: "host".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["referrerURL"], "https://host/page");
        assert_eq!(value["referrerHost"], "host");
    }

    #[test]
    fn test_inbound_loaded_parses_nested_config() {
        let value = json!({
            "event": "loaded",
            "config": {"authToken": "tok-1", "channelConfig": {"widgetColor": "#1f93ff"}}
        });
        let msg: InboundMessage = serde_json::from_value(value).unwrap();
        match msg {
            InboundMessage::Loaded { config } => {
                assert_eq!(config.auth_token, "tok-1");
                assert_eq!(config.channel_config.widget_color.as_deref(), Some("#1f93ff"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_inbound_unit_variant_ignores_extra_fields() {
        let value = json!({"event": "closeChat", "version": 1});
        let msg: InboundMessage = serde_json::from_value(value).unwrap();
        assert_eq!(msg, InboundMessage::CloseChat);
    }

    #[test]
    fn test_inbound_tags_are_known() {
        for tag in InboundMessage::TAGS {
            assert!(InboundMessage::is_known_tag(tag));
        }
        assert!(!InboundMessage::is_known_tag("somethingElse"));
    }
}
