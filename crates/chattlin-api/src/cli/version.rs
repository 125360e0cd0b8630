//! Version CLI commands.

use anyhow::{Context, Result};
use console::style;

use chattlin_core::version::{CURRENT_VERSION, VersionStatus};
use chattlin_types::version::{SkipReason, VersionCheckOutcome};

use crate::state::AppState;

/// Run the version check once and report the outcome.
pub async fn check_version(state: &AppState, json: bool) -> Result<()> {
    let outcome = state
        .version_job
        .perform()
        .await
        .context("version check failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    match &outcome {
        VersionCheckOutcome::Stored { version } => println!(
            "  {} Latest version {} recorded",
            style("ok").green(),
            style(version).cyan().bold(),
        ),
        VersionCheckOutcome::Skipped {
            reason: SkipReason::NonProduction,
        } => println!(
            "  {} Skipped: environment is '{}', checks only run in production",
            style("i").blue().bold(),
            state.config.environment,
        ),
        VersionCheckOutcome::Skipped {
            reason: SkipReason::NoUpstreamVersion,
        } => println!(
            "  {} Skipped: the hub at {} reported no version",
            style("!").yellow().bold(),
            style(&state.config.hub.url).dim(),
        ),
    }
    println!();
    Ok(())
}

/// Print the running version against the latest recorded one.
pub async fn show_version(state: &AppState, json: bool) -> Result<()> {
    let latest = state.version_job.latest_recorded().await?;
    let checked_at = state.version_job.last_checked_at().await?;
    let status = VersionStatus::new(CURRENT_VERSION, latest);

    if json {
        let mut value = serde_json::to_value(&status)?;
        value["last_checked_at"] = serde_json::json!(checked_at.map(|t| t.to_rfc3339()));
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("  Running   {}", style(&status.current).cyan());
    match &status.latest {
        Some(latest) => println!("  Latest    {}", style(latest).cyan()),
        None => println!("  Latest    {}", style("unknown").dim()),
    }
    match checked_at {
        Some(at) => println!("  Checked   {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("  Checked   {}", style("never").dim()),
    }
    if status.update_available {
        println!();
        println!("  {} An update is available.", style("!").yellow().bold());
    }
    println!();
    Ok(())
}
