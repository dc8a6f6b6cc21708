use axum::{extract::State, http::StatusCode, Json};

use crate::common::AppState;
use crate::dashboard::Command;
use crate::error::{AppError, AppResult};
use crate::telemetry::geometry::PointerEvent;

/// Open the tooltip for a chart point
#[utoipa::path(
    post,
    path = "/api/chart/click",
    request_body = PointerEvent,
    responses(
        (status = 202, description = "Tooltip requested"),
        (status = 400, description = "Metric not in the deployment's set"),
        (status = 404, description = "No point at that index"),
    ),
    tag = "chart"
)]
pub async fn point_click(
    State(state): State<AppState>,
    Json(pointer): Json<PointerEvent>,
) -> AppResult<StatusCode> {
    let snapshot = state.dashboard.snapshot();
    if !snapshot.metric_set.kinds().contains(&pointer.metric) {
        return Err(AppError::BadRequest(format!(
            "Metric {:?} is not charted for the {:?} set",
            pointer.metric, snapshot.metric_set
        )));
    }

    let points = snapshot.points.len();
    if pointer.index >= points {
        return Err(AppError::NotFound(format!(
            "No chart point at index {} ({points} points)",
            pointer.index
        )));
    }

    state.dashboard.send(Command::PointClick(pointer)).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Close the tooltip
#[utoipa::path(
    delete,
    path = "/api/chart/tooltip",
    responses(
        (status = 202, description = "Tooltip dismissed"),
    ),
    tag = "chart"
)]
pub async fn dismiss_tooltip(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.dashboard.send(Command::DismissTooltip).await?;
    Ok(StatusCode::ACCEPTED)
}
