//! Message relay between the host page and the widget frame.
//!
//! Browser cross-origin frames share no memory, so the host and the frame
//! exchange marker-prefixed JSON strings over `postMessage`. [`Relay`] owns
//! the outbound side (encode, post, forget) and the inbound side (decode and
//! count). Dispatch of decoded messages lives in the controller.

pub mod codec;

use std::cell::RefCell;
use std::rc::Rc;

use chattlin_types::error::RelayError;
use chattlin_types::relay::{InboundMessage, OutboundMessage, RELAY_MARKER};
use serde::Serialize;
use tracing::{debug, trace};

pub use codec::{Decoded, IgnoreReason, decode, encode};

/// Delivers encoded relay strings to the widget frame.
///
/// Implementations post with a wildcard target origin and do not wait for
/// any acknowledgement.
pub trait FrameTransport {
    fn post(&self, text: &str) -> Result<(), RelayError>;
}

/// Transport that records every posted string. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Rc<RefCell<Vec<String>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw strings posted so far.
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    /// Posted messages as JSON objects, marker stripped.
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|s| s.strip_prefix(RELAY_MARKER))
            .filter_map(|body| serde_json::from_str(body).ok())
            .collect()
    }

    /// Event tags posted so far, in order.
    pub fn sent_events(&self) -> Vec<String> {
        self.sent_json()
            .iter()
            .filter_map(|v| v["event"].as_str().map(str::to_string))
            .collect()
    }

    /// Number of posted messages with the given tag.
    pub fn count(&self, event: &str) -> usize {
        self.sent_events().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl FrameTransport for RecordingTransport {
    fn post(&self, text: &str) -> Result<(), RelayError> {
        self.sent.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Diagnostic counters for inbound traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub dispatched: u64,
    pub not_text: u64,
    pub missing_marker: u64,
    pub malformed: u64,
    pub unknown_event: u64,
    pub unsupported_version: u64,
    pub send_failures: u64,
}

impl RelayStats {
    /// Total inbound messages that were not dispatched.
    pub fn ignored(&self) -> u64 {
        self.not_text
            + self.missing_marker
            + self.malformed
            + self.unknown_event
            + self.unsupported_version
    }

    fn record(&mut self, reason: &IgnoreReason) {
        match reason {
            IgnoreReason::NotText => self.not_text += 1,
            IgnoreReason::MissingMarker => self.missing_marker += 1,
            IgnoreReason::Malformed(_) => self.malformed += 1,
            IgnoreReason::UnknownEvent(_) => self.unknown_event += 1,
            IgnoreReason::UnsupportedVersion(_) => self.unsupported_version += 1,
        }
    }
}

/// Bidirectional relay over a [`FrameTransport`].
#[derive(Debug)]
pub struct Relay<T> {
    transport: T,
    stats: RelayStats,
}

impl<T: FrameTransport> Relay<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            stats: RelayStats::default(),
        }
    }

    /// Encode and post `message`. Fire-and-forget: failures are logged and
    /// counted, never retried.
    pub fn send(&mut self, message: &OutboundMessage) {
        let result = encode(message).and_then(|text| self.transport.post(&text));
        match result {
            Ok(()) => trace!(event = message.tag(), "relay message sent"),
            Err(e) => {
                self.stats.send_failures += 1;
                debug!(event = message.tag(), error = %e, "relay message dropped");
            }
        }
    }

    /// Decode the data of a window `message` event. Returns the message when
    /// it should be dispatched.
    pub fn receive(&mut self, data: Option<&str>) -> Option<InboundMessage> {
        match decode(data) {
            Decoded::Message(message) => {
                self.stats.dispatched += 1;
                trace!(event = message.tag(), "relay message received");
                Some(message)
            }
            Decoded::Ignored(reason) => {
                self.stats.record(&reason);
                // Unrelated page traffic is the common case; keep it quiet.
                if !matches!(reason, IgnoreReason::MissingMarker | IgnoreReason::NotText) {
                    debug!(?reason, "ignored relay message");
                }
                None
            }
        }
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingTransport;

    impl FrameTransport for FailingTransport {
        fn post(&self, _text: &str) -> Result<(), RelayError> {
            Err(RelayError::FrameMissing)
        }
    }

    #[test]
    fn send_posts_encoded_message() {
        let transport = RecordingTransport::new();
        let mut relay = Relay::new(transport.clone());
        relay.send(&OutboundMessage::PushEvent {
            event_name: "webwidget.triggered".to_string(),
        });

        let sent = transport.sent_json();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["event"], "push-event");
        assert_eq!(sent[0]["eventName"], "webwidget.triggered");
        assert!(transport.sent()[0].starts_with(RELAY_MARKER));
    }

    #[test]
    fn send_failure_is_counted_not_raised() {
        let mut relay = Relay::new(FailingTransport);
        relay.send(&OutboundMessage::SetUnreadView);
        relay.send(&OutboundMessage::UnsetUnreadView);
        assert_eq!(relay.stats().send_failures, 2);
    }

    #[test]
    fn receive_counts_each_ignore_reason() {
        let mut relay = Relay::new(RecordingTransport::new());
        assert!(relay.receive(None).is_none());
        assert!(relay.receive(Some("hello")).is_none());
        assert!(relay.receive(Some("chattlin-widget:{oops")).is_none());
        assert!(relay.receive(Some(r#"chattlin-widget:{"event":"nope"}"#)).is_none());
        assert!(
            relay
                .receive(Some(r#"chattlin-widget:{"event":"closeChat","version":9}"#))
                .is_none()
        );
        assert_eq!(
            relay.receive(Some(r#"chattlin-widget:{"event":"closeChat"}"#)),
            Some(InboundMessage::CloseChat)
        );

        let stats = relay.stats();
        assert_eq!(stats.not_text, 1);
        assert_eq!(stats.missing_marker, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.unknown_event, 1);
        assert_eq!(stats.unsupported_version, 1);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.ignored(), 5);
    }

    #[test]
    fn recording_transport_helpers() {
        let transport = RecordingTransport::new();
        let mut relay = Relay::new(transport.clone());
        relay.send(&OutboundMessage::SetUnreadView);
        relay.send(&OutboundMessage::SetUnreadView);
        relay.send(&OutboundMessage::ToggleOpen { is_open: true });
        assert_eq!(transport.count("set-unread-view"), 2);
        assert_eq!(
            transport.sent_events(),
            vec!["set-unread-view", "set-unread-view", "toggle-open"]
        );
        transport.clear();
        assert!(transport.sent().is_empty());
    }
}
