//! Server-side services and port traits for Chattlin.
//!
//! This crate defines the "ports" (the key-value store, the release hub and
//! identity sinks) that the infrastructure layer implements, plus the services
//! built on them: the scheduled version check and the analytics bridge. It
//! depends only on `chattlin-types` -- never on `chattlin-infra` or any
//! database/HTTP crate.

pub mod analytics;
pub mod storage;
pub mod version;
