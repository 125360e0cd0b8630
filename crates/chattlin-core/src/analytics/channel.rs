//! Broadcast channel for identity signals.
//!
//! Built on `tokio::sync::broadcast`, the `IdentityChannel` supports multiple
//! concurrent subscribers. Publishing with no active subscribers is a no-op.

use chattlin_types::identity::IdentitySignal;
use tokio::sync::broadcast;

/// Default capacity; identity changes are rare.
pub const DEFAULT_CAPACITY: usize = 64;

/// Multi-consumer channel for dashboard identity changes.
///
/// Cloning the channel clones the sender, allowing multiple producers and
/// consumers.
#[derive(Clone)]
pub struct IdentityChannel {
    sender: broadcast::Sender<IdentitySignal>,
}

impl IdentityChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future signals.
    pub fn subscribe(&self) -> broadcast::Receiver<IdentitySignal> {
        self.sender.subscribe()
    }

    /// Publish a signal to all current subscribers. Returns how many
    /// subscribers it reached; with none the signal is dropped.
    pub fn publish(&self, signal: IdentitySignal) -> usize {
        self.sender.send(signal).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for IdentityChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for IdentityChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityChannel")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_subscribe_delivers_signal() {
        let channel = IdentityChannel::default();
        let mut rx = channel.subscribe();

        assert_eq!(channel.publish(IdentitySignal::Reset), 1);
        assert_eq!(rx.recv().await.unwrap(), IdentitySignal::Reset);
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_signal() {
        let channel = IdentityChannel::default();
        let mut rx1 = channel.subscribe();
        let mut rx2 = channel.subscribe();

        assert_eq!(channel.publish(IdentitySignal::Reset), 2);
        assert_eq!(rx1.recv().await.unwrap(), IdentitySignal::Reset);
        assert_eq!(rx2.recv().await.unwrap(), IdentitySignal::Reset);
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let channel = IdentityChannel::default();
        assert_eq!(channel.publish(IdentitySignal::Reset), 0);
    }

    #[test]
    fn clone_shares_channel() {
        let channel = IdentityChannel::default();
        let other = channel.clone();
        let mut rx = channel.subscribe();

        other.publish(IdentitySignal::Reset);
        assert!(rx.try_recv().is_ok());
        assert_eq!(other.subscriber_count(), 1);
    }

    #[test]
    fn debug_impl() {
        let channel = IdentityChannel::default();
        let debug = format!("{channel:?}");
        assert!(debug.contains("IdentityChannel"));
        assert!(debug.contains("receiver_count"));
    }
}
