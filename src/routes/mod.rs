pub mod chart;
pub mod dashboard;
pub mod filter;
pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::dashboard::{PollError, Snapshot};
use crate::telemetry::filter::FilterState;
use crate::telemetry::geometry::{BoundingBox, PlotPoint, PointerEvent, Series, Tooltip};
use crate::telemetry::metric::{MetricKind, MetricSet, Status};
use crate::telemetry::reading::{DerivedPoint, Reading};
use crate::telemetry::stats::Statistics;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        dashboard::get_dashboard,
        dashboard::refresh,
        filter::select_date,
        filter::clear_date,
        filter::toggle_show_all,
        chart::point_click,
        chart::dismiss_tooltip,
    ),
    components(
        schemas(
            Snapshot,
            PollError,
            FilterState,
            Reading,
            DerivedPoint,
            Series,
            PlotPoint,
            Statistics,
            Tooltip,
            PointerEvent,
            BoundingBox,
            MetricKind,
            MetricSet,
            Status,
            filter::DateSelection,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Derived dashboard state and refresh"),
        (name = "filter", description = "Date filter and list expansion"),
        (name = "chart", description = "Chart tooltips"),
    ),
    info(
        title = "Telemetry Dash API",
        description = "Live sensor telemetry dashboard state for the view layer",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/refresh", post(dashboard::refresh))
        .route(
            "/filter/date",
            put(filter::select_date).delete(filter::clear_date),
        )
        .route("/filter/show-all", post(filter::toggle_show_all))
        .route("/chart/click", post(chart::point_click))
        .route("/chart/tooltip", delete(chart::dismiss_tooltip))
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    // Health check routes
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
