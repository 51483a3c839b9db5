use anyhow::{Context, Result};
use std::sync::Arc;
use tallyslip_ocr::Extractor;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{prelude::*, EnvFilter};

mod config;
mod error;
mod routes;

use config::ServerConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()?;

    // Loaded once; every request reads the same immutable table.
    let catalog = Arc::new(config.load_catalog()?);
    let state = AppState { extractor: Extractor::new(catalog) };
    let app = routes::router(state, config.body_limit);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(addr = %config.bind, "tallyslip server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer =
        BunyanFormattingLayer::new(env!("CARGO_PKG_NAME").to_string(), std::io::stdout);
    tracing_subscriber::registry()
        .with(filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
