//! Cron scheduler wrapping `tokio-cron-scheduler` for background jobs.
//!
//! Provides:
//! - Standard cron expression parsing (6-field with seconds)
//! - Human-readable schedule normalization ("every 12 hours" -> cron)
//! - Missed-run detection for catch-up on restart
//! - Named job lifecycle (schedule, unschedule, start, stop)

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

/// Errors that can occur during scheduling operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler error: {0}")]
    Job(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("job '{0}' not registered in scheduler")]
    NotFound(String),
}

/// Normalize a human-readable schedule string to a cron expression.
///
/// Supported patterns (case-insensitive):
/// - "every N seconds"     -> "*/N * * * * *"
/// - "every N minutes"     -> "0 */N * * * *"
/// - "every N hours"       -> "0 0 */N * * *"
/// - "every minute"        -> "0 * * * * *"
/// - "every hour"          -> "0 0 * * * *"
/// - "every day"           -> "0 0 0 * * *"
/// - "every day at HH:MM"  -> "0 MM HH * * *"
/// - "hourly"              -> "0 0 * * * *"
/// - "daily"               -> "0 0 0 * * *"
///
/// Five-field cron gets a leading seconds field; six-field cron passes
/// through.
pub fn normalize_schedule(input: &str) -> Result<String, SchedulerError> {
    let trimmed = input.trim();
    let invalid = || SchedulerError::InvalidSchedule(input.to_string());

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() == 5 {
        return Ok(format!("0 {}", parts.join(" ")));
    }
    if parts.len() == 6 {
        return Ok(parts.join(" "));
    }

    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "every minute" | "minutely" => return Ok("0 * * * * *".to_string()),
        "every hour" | "hourly" => return Ok("0 0 * * * *".to_string()),
        "every day" | "daily" => return Ok("0 0 0 * * *".to_string()),
        _ => {}
    }

    let Some(rest) = lower.strip_prefix("every ") else {
        return Err(SchedulerError::InvalidSchedule(format!(
            "unrecognized schedule format: '{trimmed}'"
        )));
    };

    if let Some(at) = rest.strip_prefix("day at ") {
        let (hour, minute) = at.split_once(':').ok_or_else(invalid)?;
        let hour: u32 = hour.trim().parse().map_err(|_| invalid())?;
        let minute: u32 = minute.trim().parse().map_err(|_| invalid())?;
        if hour < 24 && minute < 60 {
            return Ok(format!("0 {minute} {hour} * * *"));
        }
        return Err(invalid());
    }

    let words: Vec<&str> = rest.split_whitespace().collect();
    let [n, unit] = words.as_slice() else {
        return Err(invalid());
    };
    let n: u32 = n.parse().map_err(|_| invalid())?;
    if n == 0 {
        return Err(SchedulerError::InvalidSchedule(
            "interval must be > 0".to_string(),
        ));
    }
    match unit.trim_end_matches('s') {
        "second" => Ok(format!("*/{n} * * * * *")),
        "minute" => Ok(format!("0 */{n} * * * *")),
        "hour" => Ok(format!("0 0 */{n} * * *")),
        _ => Err(invalid()),
    }
}

/// Occurrences of `schedule` strictly after `since` and before `now`.
///
/// Returns an empty list for schedules that do not parse.
pub fn missed_runs(schedule: &str, since: DateTime<Utc>, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let Ok(cron_expr) = normalize_schedule(schedule) else {
        return Vec::new();
    };
    let Ok(cron) = cron_expr.parse::<croner::Cron>() else {
        return Vec::new();
    };
    cron.iter_after(since).take_while(|next| *next < now).collect()
}

/// Callback type invoked when a cron trigger fires.
pub type CronCallback =
    Arc<dyn Fn(DateTime<Utc>) -> futures_util::future::BoxFuture<'static, ()> + Send + Sync>;

struct ScheduledJob {
    job_id: Uuid,
    cron_expr: String,
}

/// Cron scheduler that wraps `tokio-cron-scheduler::JobScheduler`.
///
/// Jobs are registered under a name; scheduling a name twice replaces the
/// earlier registration.
pub struct CronScheduler {
    inner: Arc<RwLock<Option<JobScheduler>>>,
    jobs: Arc<RwLock<HashMap<String, ScheduledJob>>>,
}

impl CronScheduler {
    /// Create a new cron scheduler (not yet started).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start the scheduler. Must be called before scheduling jobs.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::Job(e.to_string()))?;

        scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::Job(e.to_string()))?;

        *self.inner.write().await = Some(scheduler);

        tracing::info!("cron scheduler started");
        Ok(())
    }

    /// Stop the scheduler and forget all jobs.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        if let Some(mut scheduler) = self.inner.write().await.take() {
            scheduler
                .shutdown()
                .await
                .map_err(|e| SchedulerError::Job(e.to_string()))?;
            tracing::info!("cron scheduler stopped");
        }
        self.jobs.write().await.clear();
        Ok(())
    }

    /// Run `callback` on `schedule` (cron or human-readable, see
    /// [`normalize_schedule`]).
    pub async fn schedule(
        &self,
        name: &str,
        schedule: &str,
        callback: CronCallback,
    ) -> Result<(), SchedulerError> {
        let cron_expr = normalize_schedule(schedule)?;

        if self.jobs.read().await.contains_key(name) {
            self.unschedule(name).await?;
        }

        let inner = self.inner.read().await;
        let scheduler = inner
            .as_ref()
            .ok_or_else(|| SchedulerError::Job("scheduler not started".to_string()))?;

        let job_name = name.to_string();
        let job = Job::new_async(cron_expr.as_str(), move |_uuid, _lock| {
            let cb = callback.clone();
            let job_name = job_name.clone();
            Box::pin(async move {
                let now = Utc::now();
                tracing::debug!(job = %job_name, %now, "cron trigger fired");
                cb(now).await;
            })
        })
        .map_err(|e| SchedulerError::InvalidSchedule(e.to_string()))?;

        let job_id = job.guid();
        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::Job(e.to_string()))?;

        tracing::info!(job = name, %job_id, cron = %cron_expr, "job scheduled");
        self.jobs
            .write()
            .await
            .insert(name.to_string(), ScheduledJob { job_id, cron_expr });
        Ok(())
    }

    /// Remove a job from the scheduler.
    pub async fn unschedule(&self, name: &str) -> Result<(), SchedulerError> {
        let entry = self
            .jobs
            .write()
            .await
            .remove(name)
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))?;

        if let Some(scheduler) = self.inner.read().await.as_ref() {
            scheduler
                .remove(&entry.job_id)
                .await
                .map_err(|e| SchedulerError::Job(e.to_string()))?;
        }

        tracing::info!(job = name, "job unscheduled");
        Ok(())
    }

    /// Normalized cron expression of a registered job.
    pub async fn cron_expr(&self, name: &str) -> Option<String> {
        self.jobs.read().await.get(name).map(|j| j.cron_expr.clone())
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }
}

impl Default for CronScheduler {
    fn default() -> Self {
        Self::new()
    }
}
