//! Identity signals from the dashboard.
//!
//! POST /api/v1/analytics/identify - a user signed in
//! POST /api/v1/analytics/reset    - the user signed out
//!
//! Both publish on the identity channel. Without a configured analytics
//! integration nothing subscribes and the signal is dropped.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use chattlin_types::identity::{DashboardUser, IdentitySignal};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Published {
    pub signal: &'static str,
    /// Subscribers the signal reached.
    pub delivered_to: usize,
}

pub async fn identify(
    State(state): State<AppState>,
    Json(user): Json<DashboardUser>,
) -> Result<Json<ApiResponse<Published>>, AppError> {
    let clock = RequestClock::start();
    if user.id.trim().is_empty() {
        return Err(AppError::Validation("user id must not be empty".to_string()));
    }

    let delivered_to = state.identity.publish(IdentitySignal::Identify { user });
    Ok(Json(clock.respond(Published {
        signal: "identify",
        delivered_to,
    })))
}

pub async fn reset(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Published>>, AppError> {
    let clock = RequestClock::start();
    let delivered_to = state.identity.publish(IdentitySignal::Reset);
    Ok(Json(clock.respond(Published {
        signal: "reset",
        delivered_to,
    })))
}
