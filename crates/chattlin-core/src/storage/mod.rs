//! Storage abstractions for Chattlin.
//!
//! Implementations live in chattlin-infra.

pub mod kv_store;

pub use kv_store::KvStore;
