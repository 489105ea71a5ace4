//! Toolwatch Server - equipment status and maintenance tracking
//!
//! REST API server over the tool status engine.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

use toolwatch_server::{
    api,
    clock::SystemClock,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::{monitor::StatusMonitor, Services},
    storage, AppState,
};

/// Install the tracing subscriber. The returned guard flushes the file writer on drop.
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("toolwatch_server={},tower_http=debug", config.level).into());

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if config.format == "json" {
        layers.push(tracing_subscriber::fmt::layer().json().boxed());
    } else {
        layers.push(tracing_subscriber::fmt::layer().boxed());
    }

    // Optional daily rolling file, always JSON
    let guard = config.directory.as_ref().map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, "toolwatch.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
        guard
    });

    tracing_subscriber::registry().with(layers).with(filter).init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Toolwatch Server v{}", env!("CARGO_PKG_VERSION"));

    // Persistence falls back to memory when the backend is unreachable
    let storage = storage::connect(&config.storage).await;
    let repository = Repository::load(storage.clone(), config.storage.seed_demo_data).await;

    let services = Services::new(repository, Arc::new(SystemClock), config.auth.clone());
    let monitor = StatusMonitor::spawn(services.status.clone(), config.engine.recompute_interval());

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        storage,
    };
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    monitor.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}
