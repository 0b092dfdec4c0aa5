// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod acquire;
pub mod analyze;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod scoring;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::info;

pub use analyze::ai_adapter;
pub use crate::api::{router, AppState};

use crate::acquire::HttpFetcher;
use crate::analyze::{ai_adapter::build_oracle, Orchestrator};
use crate::config::AppConfig;
use crate::scoring::{FileModelStore, ScoringModel};

/// Wire production dependencies for `config`. The model file is not touched here.
pub fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let oracle = build_oracle(&config.ai).context("build oracle client")?;
    let orchestrator = Orchestrator::new(oracle);
    let fetcher = HttpFetcher::new().context("build page fetcher")?;
    let scoring = ScoringModel::new(Arc::new(FileModelStore::new(config.model_path.clone())));

    let metrics = if config.debug_routes {
        Some(metrics::install().context("install prometheus recorder")?)
    } else {
        None
    };
    metrics::record_oracle_configured(orchestrator.is_configured());

    info!(
        environment = %config.environment,
        oracle = orchestrator.provider_name(),
        api_key_present = config.ai.api_key.is_some(),
        ai_configured = config.ai.is_configured(),
        model = %scoring.location(),
        debug_routes = config.debug_routes,
        "application state ready"
    );

    Ok(AppState {
        config: Arc::new(config),
        orchestrator: Arc::new(orchestrator),
        fetcher: Arc::new(fetcher),
        scoring: Arc::new(scoring),
        metrics,
    })
}

/// Full in-process app from the process environment (used by tests and the binary).
pub async fn app() -> anyhow::Result<Router> {
    let state = build_state(AppConfig::from_env())?;
    Ok(router(state))
}
