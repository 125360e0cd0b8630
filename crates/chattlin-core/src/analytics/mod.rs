//! Dashboard identity forwarding to product analytics.
//!
//! The dashboard publishes [`IdentitySignal`]s on an [`IdentityChannel`] when
//! a user signs in or out. [`AnalyticsBridge`] subscribes and forwards each
//! signal to every registered [`IdentitySink`].
//!
//! [`IdentitySignal`]: chattlin_types::identity::IdentitySignal

pub mod bridge;
pub mod channel;
pub mod sink;

pub use bridge::AnalyticsBridge;
pub use channel::IdentityChannel;
pub use sink::{IdentitySink, IdentitySinkDyn};
