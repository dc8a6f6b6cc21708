use axum::{extract::State, http::StatusCode, Json};

use crate::common::AppState;
use crate::dashboard::{Command, Snapshot};
use crate::error::AppResult;

/// Current dashboard state
///
/// Filtered and visible readings, chart series, statistics, tooltip and
/// poll status, all taken from the same recompute.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Current snapshot", body = Snapshot),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.dashboard.snapshot().as_ref().clone())
}

/// Trigger a refresh now
///
/// Shares the periodic poll path; a refresh while a poll is running is
/// folded into it.
#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 202, description = "Refresh queued"),
        (status = 503, description = "Dashboard stopped"),
    ),
    tag = "dashboard"
)]
pub async fn refresh(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.dashboard.send(Command::Refresh).await?;
    Ok(StatusCode::ACCEPTED)
}
