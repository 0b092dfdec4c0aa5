//! Website analyzer: binary entrypoint.
//! Loads `.env`, initializes tracing and the scoring model, then serves the router.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use website_analyzer::{
    build_state,
    config::{AppConfig, ENV_ENVIRONMENT},
    router,
};

const DEFAULT_LOG_FILTER: &str = "website_analyzer=info,tower_http=info";

/// Compact logs in development, JSON lines in production.
fn init_tracing() {
    let production = std::env::var(ENV_ENVIRONMENT)
        .map(|v| v.trim().eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if production {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let reset = config.reset_model_on_start;
    let state = build_state(config)?;

    // A failed init is retried lazily by the first prediction.
    let scoring = state.scoring.clone();
    match tokio::task::spawn_blocking(move || scoring.ensure_initialized(reset)).await {
        Ok(Ok(origin)) => info!(?origin, reset, "scoring model initialized"),
        Ok(Err(e)) => error!(error = %e, "scoring model initialization failed"),
        Err(e) => error!(error = %e, "scoring model initialization panicked"),
    }

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;
    Ok(())
}
