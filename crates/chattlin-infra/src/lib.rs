//! Infrastructure layer for Chattlin.
//!
//! Contains implementations of the port traits defined in `chattlin-core`:
//! SQLite and in-memory key-value stores, the release hub HTTP client, the
//! product analytics identity sink, and the global config loader.

pub mod analytics;
pub mod config;
pub mod hub;
pub mod memory;
pub mod sqlite;
