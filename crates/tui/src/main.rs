mod app;

use std::fs::{self, OpenOptions};
use std::sync::Arc;

use anyhow::Result;
use backlog_core::{
    config::{self, AppConfig},
    CatalogClient,
};
use tokio::sync::mpsc;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::app::{BacklogApp, ChannelNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let (notice_tx, notice_rx) = mpsc::channel(8);
    let notifier = Arc::new(ChannelNotifier::new(notice_tx));
    let client = CatalogClient::new(&config.api_base_url, notifier)?;

    let mut app = BacklogApp::new(client);
    app.attach_notices(notice_rx);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("backlog.log");

    let env_filter = EnvFilter::from_default_env();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
