//! GET /api/v1/health - liveness probe.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use chattlin_core::version::CURRENT_VERSION;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub store: &'static str,
}

pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Health>>, AppError> {
    let health = Health {
        status: "ok",
        version: CURRENT_VERSION,
        environment: state.config.environment.to_string(),
        store: state.kv_store.backend(),
    };
    Ok(Json(
        RequestClock::start()
            .respond(health)
            .with_link("version", "/api/v1/version"),
    ))
}
