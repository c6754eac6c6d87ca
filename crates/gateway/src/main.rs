use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing_subscriber::{prelude::*, EnvFilter};

use backlog_gateway::{build_router, AppState, GatewayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        "starting gateway on {} (api key set: {}, api url set: {})",
        config.bind,
        config.has_api_key(),
        config.has_api_url()
    );

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let router = build_router(AppState::new(config));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

fn init_logging() {
    let env_filter = EnvFilter::from_default_env();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
}
