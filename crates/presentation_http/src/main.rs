//! Krishi HTTP server
//!
//! Main entry point: loads configuration, wires the call pipeline and serves
//! the webhook and API.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use infrastructure::{AppConfig, AsyncDatabase, AsyncDatabaseConfig, init_telemetry};
use presentation_http::{AppState, RequestIdLayer, create_router};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _telemetry = init_telemetry(&config.telemetry)?;
    info!("Krishi v{} starting", env!("CARGO_PKG_VERSION"));

    let database = AsyncDatabase::new(&AsyncDatabaseConfig::from_app_config(&config.database)?).await?;
    if config.database.run_migrations {
        database.migrate().await?;
    }

    let state = AppState::assemble(&config, database)
        .map_err(|e| anyhow::anyhow!("Failed to start call pipeline: {e}"))?;
    info!(providers = ?state.registry.summary(), "Call pipeline ready");

    let app = create_router(state.clone())
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(cors_layer(&config.server.allowed_origins, config.server.cors_enabled))
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new());

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // queued calls get the configured grace period to finish
    state
        .shutdown(Duration::from_secs(config.server.shutdown_timeout_secs))
        .await;

    info!("Server shutdown complete");
    Ok(())
}

fn cors_layer(allowed_origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        return CorsLayer::new();
    }
    if allowed_origins.is_empty() {
        // Development mode: allow all origins
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
