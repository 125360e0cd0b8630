//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use chattlin_observe::{TracingOptions, init_tracing};
//!
//! // Human-readable logs at `info`, overridable with RUST_LOG
//! init_tracing(&TracingOptions::default()).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::OnceLock;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// How the global subscriber is set up.
#[derive(Debug, Clone)]
pub struct TracingOptions {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `"info"`,
    /// `"chattlin=debug"`).
    pub default_filter: String,
    /// Emit one JSON object per event instead of human-readable lines.
    pub json: bool,
    /// Bridge spans to OpenTelemetry with a stdout exporter.
    pub enable_otel: bool,
}

impl Default for TracingOptions {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            json: false,
            enable_otel: false,
        }
    }
}

impl TracingOptions {
    /// Options for a CLI verbosity level: `quiet` wins, then each `-v` raises
    /// the level from `warn` (0) through `info`, `debug` and `trace`.
    pub fn for_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        };
        Self {
            default_filter: level.to_string(),
            ..Self::default()
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize the global tracing subscriber.
///
/// - Installs a `fmt` layer (plain or JSON) with span close timing.
/// - When `enable_otel` is set, additionally bridges tracing spans to
///   OpenTelemetry using a stdout exporter.
/// - `RUST_LOG` takes precedence over `default_filter`.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(options: &TracingOptions) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = options.env_filter();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);
    let fmt_layer = if options.json {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.boxed()
    };

    let otel_layer = options.enable_otel.then(|| {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("chattlin");

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// No-op when OTel was not enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(TracingOptions::for_verbosity(0, false).default_filter, "warn");
        assert_eq!(TracingOptions::for_verbosity(1, false).default_filter, "info");
        assert_eq!(TracingOptions::for_verbosity(2, false).default_filter, "debug");
        assert_eq!(TracingOptions::for_verbosity(5, false).default_filter, "trace");
        assert_eq!(TracingOptions::for_verbosity(3, true).default_filter, "error");
    }

    #[test]
    fn second_init_fails() {
        let options = TracingOptions::default();
        let _ = init_tracing(&options);
        assert!(init_tracing(&options).is_err());
    }
}
