use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::dashboard::Command;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct DateSelection {
    /// Calendar day, `YYYY-MM-DD`
    pub date: NaiveDate,
}

/// Select a calendar day
///
/// Applied after a short debounce; rapid successive selections collapse to
/// the last one.
#[utoipa::path(
    put,
    path = "/api/filter/date",
    request_body = DateSelection,
    responses(
        (status = 202, description = "Selection queued"),
        (status = 400, description = "Date is in the future"),
    ),
    tag = "filter"
)]
pub async fn select_date(
    State(state): State<AppState>,
    Json(selection): Json<DateSelection>,
) -> AppResult<StatusCode> {
    let max = state.dashboard.snapshot().max_selectable_date;
    if selection.date > max {
        return Err(AppError::BadRequest(format!(
            "Date {} is after {max}",
            selection.date
        )));
    }

    state.dashboard.send(Command::SelectDate(selection.date)).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Clear the date filter
#[utoipa::path(
    delete,
    path = "/api/filter/date",
    responses(
        (status = 202, description = "Filter cleared"),
    ),
    tag = "filter"
)]
pub async fn clear_date(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.dashboard.send(Command::ClearFilter).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Toggle between the collapsed and full reading list
#[utoipa::path(
    post,
    path = "/api/filter/show-all",
    responses(
        (status = 202, description = "Toggle queued"),
    ),
    tag = "filter"
)]
pub async fn toggle_show_all(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.dashboard.send(Command::ToggleShowAll).await?;
    Ok(StatusCode::ACCEPTED)
}
