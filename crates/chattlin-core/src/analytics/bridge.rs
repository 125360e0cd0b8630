//! Forwards identity signals to analytics sinks.

use chattlin_types::identity::IdentitySignal;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::sink::{IdentitySink, IdentitySinkDyn};

/// Fans identity signals out to every registered sink.
///
/// A failing sink is logged and skipped; the remaining sinks still receive
/// the signal and the bridge keeps running.
#[derive(Default)]
pub struct AnalyticsBridge {
    sinks: Vec<Box<dyn IdentitySinkDyn>>,
}

impl AnalyticsBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl IdentitySink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver one signal. Returns how many sinks accepted it.
    pub async fn forward(&self, signal: &IdentitySignal) -> usize {
        let mut delivered = 0;
        for sink in &self.sinks {
            let result = match signal {
                IdentitySignal::Identify { user } => sink.identify_boxed(user).await,
                IdentitySignal::Reset => sink.reset_boxed().await,
            };
            match result {
                Ok(()) => delivered += 1,
                Err(e) => warn!(sink = sink.name(), error = %e, "identity sink failed"),
            }
        }
        delivered
    }

    /// Forward signals from `receiver` until the channel closes or `cancel`
    /// fires.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<IdentitySignal>,
        cancel: CancellationToken,
    ) {
        info!(sinks = self.sinks.len(), "analytics bridge started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = receiver.recv() => match received {
                    Ok(signal) => {
                        let delivered = self.forward(&signal).await;
                        debug!(?signal, delivered, "identity signal forwarded");
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "analytics bridge lagged; signals dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        info!("analytics bridge stopped");
    }
}
