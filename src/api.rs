// src/api.rs
//! HTTP surface: `/health`, `/components`, `/train-model`, `/demo-data`, optional `/metrics`.
//!
//! Only malformed requests get a 4xx. Fetch, scoring, and training failures are
//! reported inside a 200 body so the frontend always has something to render.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::acquire::{acquire, anon_hash, AnalysisInput, AnalysisRequest, PageFetcher};
use crate::analyze::{fallback, AnalysisResult, Orchestrator};
use crate::config::AppConfig;
use crate::error::{AnalysisError, ModelError};
use crate::metrics::ANALYSIS_REQUESTS;
use crate::scoring::{ScoreInput, ScoringModel, TrainingOutcome};

pub const ERROR_FALLBACK_NOTE: &str = "Using demo data due to error";
pub const MISSING_TRAINING_FIELDS: &str = "Missing required fields: html and user_score";
/// Request body cap; full-page screenshots as data URLs run well past axum's 2 MB default.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

type JsonBody = Result<Json<Map<String, Value>>, JsonRejection>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<Orchestrator>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub scoring: Arc<ScoringModel>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/components", post(components))
        .route("/train-model", post(train_model))
        .route("/demo-data", get(demo_data).post(demo_data));

    if state.config.debug_routes {
        if let Some(handle) = state.metrics.clone() {
            app = app.merge(crate::metrics::router(handle));
        }
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin in development; `FRONTEND_URL` (unless `*`) in production.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.is_production() {
        return CorsLayer::very_permissive();
    }
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match config.frontend_url.as_deref().map(str::trim) {
        None | Some("") | Some("*") => base.allow_origin(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(v) => base.allow_origin(AllowOrigin::exact(v)),
            Err(_) => {
                warn!(%origin, "FRONTEND_URL is not a valid origin, allowing any");
                base.allow_origin(Any)
            }
        },
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let api_key = if state.orchestrator.is_configured() {
        "available"
    } else {
        "missing"
    };
    Json(json!({
        "status": "healthy",
        "api_key": api_key,
        "environment": state.config.environment,
    }))
}

async fn demo_data() -> Json<AnalysisResult> {
    Json(fallback::demo_result())
}

async fn components(State(state): State<AppState>, payload: JsonBody) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let request = match AnalysisRequest::from_fields(
        text_field(&body, "url"),
        text_field(&body, "html"),
        text_field(&body, "image"),
    ) {
        Ok(r) => r,
        Err(e) => return bad_request(e.to_string()),
    };
    let kind = request.kind();
    let is_image = request.is_image();

    if !state.orchestrator.is_configured() {
        counter!(ANALYSIS_REQUESTS, "input" => kind, "mode" => "demo").increment(1);
        info!(input = kind, "oracle not configured, serving demo payload");
        let result = if is_image {
            fallback::image_demo_result()
        } else {
            fallback::demo_result()
        };
        return Json(result).into_response();
    }

    match run_analysis(&state, request).await {
        Ok(result) => {
            counter!(ANALYSIS_REQUESTS, "input" => kind, "mode" => "oracle").increment(1);
            Json(result).into_response()
        }
        Err(e) => {
            counter!(ANALYSIS_REQUESTS, "input" => kind, "mode" => "error").increment(1);
            warn!(input = kind, error = %e, "analysis failed, serving error payload");
            if is_image {
                Json(fallback::image_error_result(e.to_string())).into_response()
            } else {
                Json(json!({
                    "error": e.to_string(),
                    "fallback": ERROR_FALLBACK_NOTE,
                    "demo": true,
                }))
                .into_response()
            }
        }
    }
}

async fn run_analysis(
    state: &AppState,
    request: AnalysisRequest,
) -> Result<AnalysisResult, AnalysisError> {
    let acquired = acquire(state.fetcher.as_ref(), request).await?;

    let website_score = match &acquired.input {
        AnalysisInput::Page { html, .. } => {
            let scoring = state.scoring.clone();
            let html = html.clone();
            let score = blocking(move || {
                let input = ScoreInput::from_parts(None, Some(&html))?;
                Ok(scoring.predict_score(input)?)
            })
            .await?;
            Some(score)
        }
        AnalysisInput::Image(_) => None,
    };

    Ok(state
        .orchestrator
        .analyze(&acquired.input, acquired.source, website_score)
        .await)
}

#[derive(Debug, Serialize)]
struct TrainResponse {
    success: bool,
    message: &'static str,
    old_score: f64,
    new_score: f64,
    model_updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    demo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TrainResponse {
    fn trained(outcome: TrainingOutcome) -> Self {
        Self {
            success: true,
            message: "Model trained successfully",
            old_score: outcome.old_score,
            new_score: outcome.new_score,
            model_updated: outcome.model_updated,
            demo: None,
            error: None,
        }
    }

    fn skipped() -> Self {
        Self {
            success: true,
            message: "Model training skipped (Demo Mode)",
            old_score: fallback::NEUTRAL_SCORE,
            new_score: fallback::NEUTRAL_SCORE,
            model_updated: false,
            demo: Some(true),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            message: "Error training model, but service remains available",
            old_score: fallback::NEUTRAL_SCORE,
            new_score: fallback::NEUTRAL_SCORE,
            model_updated: false,
            demo: None,
            error: Some(error),
        }
    }
}

async fn train_model(State(state): State<AppState>, payload: JsonBody) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let (Some(html), Some(raw_score)) = (text_field(&body, "html"), body.get("user_score")) else {
        return bad_request(MISSING_TRAINING_FIELDS);
    };

    if !state.orchestrator.is_configured() {
        return Json(TrainResponse::skipped()).into_response();
    }

    let feedback_keys = body
        .get("user_feedback")
        .and_then(Value::as_object)
        .map_or(0, Map::len);
    info!(page = %anon_hash(&html), feedback_keys, "training request");

    let user_score = match parse_user_score(raw_score) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "training rejected");
            return Json(TrainResponse::failed(e.to_string())).into_response();
        }
    };

    let scoring = state.scoring.clone();
    let outcome = blocking(move || Ok(scoring.train_from_feedback(&html, user_score)?)).await;
    match outcome {
        Ok(outcome) => {
            info!(
                old_score = outcome.old_score,
                new_score = outcome.new_score,
                "model retrained from feedback"
            );
            Json(TrainResponse::trained(outcome)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "training failed");
            Json(TrainResponse::failed(e.to_string())).into_response()
        }
    }
}

/// JSON number or numeric string.
fn parse_user_score(raw: &Value) -> Result<f64, ModelError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ModelError::InvalidScore(raw.to_string()))
}

/// Field as text. Present-but-null reads as empty; other non-strings as their JSON text.
fn text_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key).map(|v| match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Run CPU/file-bound model work off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, AnalysisError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AnalysisError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_score_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_user_score(&json!(90)).unwrap(), 90.0);
        assert_eq!(parse_user_score(&json!(" 72.5 ")).unwrap(), 72.5);
        assert!(parse_user_score(&json!("ninety")).is_err());
        assert!(parse_user_score(&json!(null)).is_err());
        assert!(parse_user_score(&json!("inf")).is_err());
    }

    #[test]
    fn text_fields_keep_presence() {
        let body = json!({"url": null, "html": "<p>x</p>", "image": 5});
        let body = body.as_object().unwrap();
        assert_eq!(text_field(body, "url").as_deref(), Some(""));
        assert_eq!(text_field(body, "html").as_deref(), Some("<p>x</p>"));
        assert_eq!(text_field(body, "image").as_deref(), Some("5"));
        assert_eq!(text_field(body, "missing"), None);
    }

    #[test]
    fn skipped_training_carries_demo_flag() {
        let v = serde_json::to_value(TrainResponse::skipped()).unwrap();
        assert_eq!(v["demo"], true);
        assert_eq!(v["old_score"], 50.0);
        assert!(v.get("error").is_none());
    }
}
