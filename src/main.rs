use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use http_scaffold::api::handlers::AppStateInner;
use http_scaffold::api::{create_router, ServerHandle};
use http_scaffold::config::Config;
use http_scaffold::metrics;

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,http_scaffold=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HTTP scaffold v{}", env!("CARGO_PKG_VERSION"));

    metrics::registry::init_metrics();
    info!("Metrics registry initialized");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    let state = Arc::new(AppStateInner::new(config.server.app_name.clone()));

    // Application endpoints go here; they are served under /api
    let api = Router::new();
    let app = create_router(state, &config.cors, api);

    let server = ServerHandle::start(
        app,
        &config.server.host,
        config.server.port,
        config.server.start_timeout(),
    )
    .await
    .context("Failed to start server")?;

    info!(
        port = server.bound_port(),
        "Server running on {}",
        server.local_addr()
    );

    shutdown_signal().await;

    server
        .stop(config.server.stop_timeout())
        .await
        .context("Failed to stop server")?;

    info!("Server shutdown complete");

    Ok(())
}
