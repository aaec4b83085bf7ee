//! tone-risk binary entrypoint.
//! Loads config, initialises tracing, and serves the Axum router.

use anyhow::{Context, Result};
use tracing::info;

use tone_risk::config::AppConfig;
use tone_risk::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let app = tone_risk::build_app(&config)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("tone-risk listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    info!("tone-risk stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("ctrl-c handler failed: {e:#}");
    }
}
