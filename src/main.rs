use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telemetry_dash::common::AppState;
use telemetry_dash::config::Config;
use telemetry_dash::dashboard::{self, Dashboard, DashboardSettings, SystemClock};
use telemetry_dash::routes;
use telemetry_dash::source::ReadingsClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,telemetry_dash=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting telemetry-dash...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    tracing::info!(
        deployment = ?config.deployment,
        source = %config.readings_api_url,
        mode = ?config.source_mode,
        metric_set = ?config.metric_set,
        host = %config.api_host,
        port = config.api_port,
        "Configuration loaded"
    );

    // Create readings client
    let client = Arc::new(ReadingsClient::new(&config)?);
    tracing::info!("Readings client initialized");

    // Start the dashboard (poller + event loop)
    let controller = Dashboard::new(
        DashboardSettings {
            metric_set: config.metric_set,
            viewport: config.viewport,
            page_size: config.list_page_size,
        },
        Arc::new(SystemClock),
    );
    let (handle, task) = dashboard::runtime::spawn(
        controller,
        client,
        config.poll.clone(),
        config.date_debounce(),
    );

    // Create application state
    let addr = config.bind_address();
    let state = AppState::new(config, handle);

    // Build router
    let app = routes::build_router(state);

    // Start server with graceful shutdown
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    task.shutdown().await;
    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
