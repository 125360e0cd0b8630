//! Observability for Chattlin: tracing subscriber setup with optional
//! OpenTelemetry export.

pub mod tracing_setup;

pub use tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
