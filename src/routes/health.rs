use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(value_type = String)]
    pub status: &'static str,
    /// Set while the last poll failed and stale readings are shown.
    pub degraded: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Health check endpoint
///
/// Always 200 while the process is up; a failing upstream only marks the
/// service as degraded.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.dashboard.snapshot();
    Json(HealthResponse {
        status: "ok",
        degraded: snapshot.error.is_some(),
        last_updated: snapshot.last_updated,
    })
}
