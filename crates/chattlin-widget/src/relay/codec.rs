//! Wire codec for host/frame relay messages.
//!
//! A relay message is [`RELAY_MARKER`] followed by a JSON object carrying an
//! `event` tag and a `version`. Decoding never fails loudly: anything that is
//! not a well-formed message this host understands comes back as
//! [`Decoded::Ignored`] with the reason, so unrelated cross-frame traffic on
//! the page passes through untouched.

use chattlin_types::error::RelayError;
use chattlin_types::relay::{InboundMessage, OutboundMessage, RELAY_MARKER, RELAY_SCHEMA_VERSION};
use serde::Serialize;

/// Why an inbound message was not dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The message payload was not a string.
    NotText,
    /// The string does not start with the relay marker.
    MissingMarker,
    /// Invalid JSON, a missing tag or a payload that does not fit the tag.
    Malformed(String),
    /// A well-formed message with a tag this host does not handle.
    UnknownEvent(String),
    /// Sent by a newer frame than this host supports.
    UnsupportedVersion(u64),
}

/// Result of decoding one cross-window message.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Message(InboundMessage),
    Ignored(IgnoreReason),
}

/// Encode an outbound message for posting into the frame.
pub fn encode(message: &OutboundMessage) -> Result<String, RelayError> {
    let mut value = serde_json::to_value(message).map_err(|e| RelayError::Encode {
        tag: message.tag(),
        reason: e.to_string(),
    })?;
    if let Some(object) = value.as_object_mut() {
        object.insert("version".to_string(), RELAY_SCHEMA_VERSION.into());
    }
    Ok(format!("{RELAY_MARKER}{value}"))
}

/// Decode the `data` of a window `message` event. `None` stands for
/// non-string data.
pub fn decode(data: Option<&str>) -> Decoded {
    let Some(text) = data else {
        return Decoded::Ignored(IgnoreReason::NotText);
    };
    let Some(body) = text.strip_prefix(RELAY_MARKER) else {
        return Decoded::Ignored(IgnoreReason::MissingMarker);
    };

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return malformed(e.to_string()),
    };
    let Some(object) = value.as_object() else {
        return malformed("payload is not an object");
    };
    let Some(tag) = object.get("event").and_then(|e| e.as_str()) else {
        return malformed("missing event tag");
    };
    if !InboundMessage::is_known_tag(tag) {
        return Decoded::Ignored(IgnoreReason::UnknownEvent(tag.to_string()));
    }

    let version = match object.get("version") {
        None => 1,
        Some(v) => match v.as_u64() {
            Some(v) => v,
            None => return malformed("version is not an unsigned integer"),
        },
    };
    if version > u64::from(RELAY_SCHEMA_VERSION) {
        return Decoded::Ignored(IgnoreReason::UnsupportedVersion(version));
    }

    match serde_json::from_value::<InboundMessage>(value) {
        Ok(message) => Decoded::Message(message),
        Err(e) => malformed(e.to_string()),
    }
}

fn malformed(reason: impl Into<String>) -> Decoded {
    Decoded::Ignored(IgnoreReason::Malformed(reason.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chattlin_types::relay::BubbleState;

    fn wire(json: &str) -> String {
        format!("{RELAY_MARKER}{json}")
    }

    #[test]
    fn encode_prefixes_marker_and_version() {
        let text = encode(&OutboundMessage::ToggleCloseButton { show_close: true }).unwrap();
        let body = text.strip_prefix(RELAY_MARKER).unwrap();
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(value["event"], "toggle-close-button");
        assert_eq!(value["showClose"], true);
        assert_eq!(value["version"], 1);
    }

    #[test]
    fn encode_unit_message() {
        let text = encode(&OutboundMessage::SetUnreadView).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(text.strip_prefix(RELAY_MARKER).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"event": "set-unread-view", "version": 1}));
    }

    #[test]
    fn non_text_is_ignored() {
        assert_eq!(decode(None), Decoded::Ignored(IgnoreReason::NotText));
    }

    #[test]
    fn messages_without_marker_are_ignored() {
        for data in [
            r#"{"event":"closeChat"}"#,
            "other-widget:{\"event\":\"closeChat\"}",
            " chattlin-widget:{\"event\":\"closeChat\"}",
            "",
        ] {
            assert_eq!(
                decode(Some(data)),
                Decoded::Ignored(IgnoreReason::MissingMarker),
                "data: {data}"
            );
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        let decoded = decode(Some(&wire("{not json")));
        assert!(matches!(decoded, Decoded::Ignored(IgnoreReason::Malformed(_))));

        let decoded = decode(Some(&wire("[1,2]")));
        assert!(matches!(decoded, Decoded::Ignored(IgnoreReason::Malformed(_))));

        let decoded = decode(Some(&wire(r#"{"label":"hi"}"#)));
        assert!(matches!(decoded, Decoded::Ignored(IgnoreReason::Malformed(_))));
    }

    #[test]
    fn unknown_tag_is_reported_by_name() {
        let decoded = decode(Some(&wire(r#"{"event":"doBarrelRoll"}"#)));
        assert_eq!(
            decoded,
            Decoded::Ignored(IgnoreReason::UnknownEvent("doBarrelRoll".to_string()))
        );
    }

    #[test]
    fn newer_schema_is_ignored() {
        let decoded = decode(Some(&wire(r#"{"event":"closeChat","version":2}"#)));
        assert_eq!(decoded, Decoded::Ignored(IgnoreReason::UnsupportedVersion(2)));
    }

    #[test]
    fn missing_version_reads_as_v1() {
        let decoded = decode(Some(&wire(r#"{"event":"closeChat"}"#)));
        assert_eq!(decoded, Decoded::Message(InboundMessage::CloseChat));
    }

    #[test]
    fn bubble_toggle_without_state_reads_as_closed() {
        let decoded = decode(Some(&wire(r#"{"event":"onBubbleToggle"}"#)));
        assert_eq!(
            decoded,
            Decoded::Message(InboundMessage::OnBubbleToggle { is_open: false })
        );
    }

    #[test]
    fn wrong_payload_shape_is_malformed() {
        let decoded = decode(Some(&wire(r#"{"event":"setUnreadMode","unreadMessageCount":"three"}"#)));
        assert!(matches!(decoded, Decoded::Ignored(IgnoreReason::Malformed(_))));
    }

    #[test]
    fn decodes_payload_fields() {
        let decoded = decode(Some(&wire(
            r#"{"event":"updateIframeHeight","extraHeight":420,"isFixedHeight":true}"#,
        )));
        assert_eq!(
            decoded,
            Decoded::Message(InboundMessage::UpdateIframeHeight {
                extra_height: Some(420.0),
                is_fixed_height: true,
            })
        );

        let decoded = decode(Some(&wire(r#"{"event":"toggleBubble","state":"open"}"#)));
        assert_eq!(
            decoded,
            Decoded::Message(InboundMessage::ToggleBubble {
                state: Some(BubbleState::Open)
            })
        );
    }
}
