//! Version status and on-demand version checks.
//!
//! GET  /api/v1/version       - running version against the latest recorded one
//! POST /api/v1/version/check - run the version check once

use axum::Json;
use axum::extract::State;

use chattlin_core::version::{CURRENT_VERSION, VersionStatus};
use chattlin_types::version::VersionCheckOutcome;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

pub async fn get_version(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<VersionStatus>>, AppError> {
    let clock = RequestClock::start();
    let latest = state.version_job.latest_recorded().await?;
    Ok(Json(clock.respond(VersionStatus::new(CURRENT_VERSION, latest))))
}

pub async fn check_version(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<VersionCheckOutcome>>, AppError> {
    let clock = RequestClock::start();
    let outcome = state.version_job.perform().await?;
    tracing::info!(?outcome, "version check requested over API");
    Ok(Json(clock.respond(outcome).with_link("status", "/api/v1/version")))
}
