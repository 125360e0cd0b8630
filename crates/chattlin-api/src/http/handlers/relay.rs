//! POST /api/v1/relay/decode - explain how the host runtime would treat a
//! cross-window message.

use axum::Json;
use serde::{Deserialize, Serialize};

use chattlin_types::relay::InboundMessage;
use chattlin_widget::relay::{Decoded, IgnoreReason, decode};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};

#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    /// Message data. Anything other than a string counts as non-text.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Decode diagnostics for one message.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub dispatchable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<InboundMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<IgnoreReason>,
}

impl DecodeReport {
    pub fn for_data(data: Option<&str>) -> Self {
        match decode(data) {
            Decoded::Message(message) => Self {
                dispatchable: true,
                event: Some(message.tag()),
                message: Some(message),
                ignored: None,
            },
            Decoded::Ignored(reason) => Self {
                dispatchable: false,
                event: None,
                message: None,
                ignored: Some(reason),
            },
        }
    }
}

pub async fn decode_message(
    Json(request): Json<DecodeRequest>,
) -> Result<Json<ApiResponse<DecodeReport>>, AppError> {
    let clock = RequestClock::start();
    let report = DecodeReport::for_data(request.data.as_str());
    Ok(Json(clock.respond(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_known_event() {
        let report = DecodeReport::for_data(Some(
            r#"chattlin-widget:{"event":"setUnreadMode","unreadMessageCount":3}"#,
        ));
        assert!(report.dispatchable);
        assert_eq!(report.event, Some("setUnreadMode"));
        assert_eq!(
            report.message,
            Some(InboundMessage::SetUnreadMode {
                unread_message_count: 3
            })
        );
    }

    #[test]
    fn test_report_for_foreign_message() {
        let report = DecodeReport::for_data(Some(r#"{"source":"react-devtools"}"#));
        assert!(!report.dispatchable);
        assert_eq!(report.ignored, Some(IgnoreReason::MissingMarker));

        let value = serde_json::to_value(DecodeReport::for_data(None)).unwrap();
        assert_eq!(value["ignored"]["reason"], "not_text");
        assert!(value.get("event").is_none());
    }
}
