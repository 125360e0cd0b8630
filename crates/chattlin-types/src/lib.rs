//! Shared domain types for Chattlin.
//!
//! This crate contains the types shared by the browser-side widget runtime and
//! the server-side services: widget configuration, the session cookie, the
//! host/frame wire messages, identity signals, version-check outcomes and
//! their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.
//! Everything here must also build for `wasm32-unknown-unknown`.

pub mod config;
pub mod error;
pub mod identity;
pub mod relay;
pub mod session;
pub mod storage;
pub mod version;
pub mod widget;
