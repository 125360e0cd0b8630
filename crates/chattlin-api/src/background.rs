//! Background work hosted by `chattlin serve`: the version-check schedule
//! and the analytics bridge.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use chattlin_core::analytics::AnalyticsBridge;
use chattlin_core::version::scheduler::missed_runs;
use chattlin_core::version::{CronCallback, CronScheduler};
use chattlin_infra::analytics::ProductAnalyticsSink;
use chattlin_types::config::AnalyticsConfig;

use crate::state::{AppState, ConcreteVersionJob};

/// Scheduler name of the version check.
pub const VERSION_CHECK_JOB: &str = "check_new_versions";

/// Start the cron scheduler with the version check registered, running a
/// catch-up check first when a scheduled run was missed.
pub async fn start_version_schedule(state: &AppState) -> anyhow::Result<CronScheduler> {
    let schedule = state.config.version_check.schedule.clone();

    let scheduler = CronScheduler::new();
    scheduler.start().await?;

    let job = state.version_job.clone();
    let callback: CronCallback = Arc::new(move |_fired_at| {
        let job = job.clone();
        async move { run_version_check(&job).await }.boxed()
    });
    scheduler
        .schedule(VERSION_CHECK_JOB, &schedule, callback)
        .await
        .with_context(|| format!("invalid version_check.schedule '{schedule}'"))?;

    if state.config.version_check.catch_up {
        catch_up(&state.version_job, &schedule).await;
    }

    Ok(scheduler)
}

/// Run the check once, logging the outcome. Failures never escape.
pub async fn run_version_check(job: &ConcreteVersionJob) {
    match job.perform().await {
        Ok(outcome) => info!(?outcome, "version check finished"),
        Err(e) => error!(error = %e, "version check failed"),
    }
}

async fn catch_up(job: &ConcreteVersionJob, schedule: &str) {
    match job.last_checked_at().await {
        Ok(Some(last)) => {
            let missed = missed_runs(schedule, last, Utc::now());
            if !missed.is_empty() {
                info!(missed = missed.len(), %last, "running missed version check");
                run_version_check(job).await;
            }
        }
        Ok(None) => {
            info!("no previous version check recorded, running one now");
            run_version_check(job).await;
        }
        Err(e) => warn!(error = %e, "could not read last version check time"),
    }
}

/// Build the bridge for the configured sinks, or `None` when analytics is
/// not configured.
pub fn analytics_bridge(config: &AnalyticsConfig) -> anyhow::Result<Option<AnalyticsBridge>> {
    let Some(sink) = ProductAnalyticsSink::from_config(config)? else {
        return Ok(None);
    };
    Ok(Some(AnalyticsBridge::new().with_sink(sink)))
}

/// Subscribe the bridge to the identity channel and run it until `cancel`.
pub fn spawn_analytics_bridge(
    state: &AppState,
    cancel: CancellationToken,
) -> anyhow::Result<Option<JoinHandle<()>>> {
    match analytics_bridge(&state.config.analytics)? {
        Some(bridge) => {
            let receiver = state.identity.subscribe();
            Ok(Some(tokio::spawn(bridge.run(receiver, cancel))))
        }
        None => {
            info!("analytics not configured, identity signals are dropped");
            Ok(None)
        }
    }
}
