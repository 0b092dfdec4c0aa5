// tests/metrics.rs
//
// Full app built from the environment (`website_analyzer::app()`), with the
// Prometheus recorder installed once for this test binary.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serial_test::serial;
use tower::ServiceExt;

const LIMIT: usize = 1_048_576;

fn set_env(model_dir: &std::path::Path, production: bool) {
    std::env::set_var("AI_TEST_MODE", "mock");
    std::env::remove_var("GEMINI_API_KEY");
    std::env::remove_var("DEBUG_ROUTES");
    std::env::set_var("MODEL_PATH", model_dir.join("score_model.json"));
    if production {
        std::env::set_var("RAILWAY_ENVIRONMENT", "production");
        std::env::set_var("FRONTEND_URL", "https://app.example.test");
    } else {
        std::env::remove_var("RAILWAY_ENVIRONMENT");
        std::env::remove_var("FRONTEND_URL");
    }
}

async fn build_app() -> Router {
    website_analyzer::app()
        .await
        .expect("app() should build Router in tests")
}

async fn text(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = body::to_bytes(resp.into_body(), LIMIT).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_contains_expected_series() {
    let dir = tempfile::tempdir().unwrap();
    set_env(dir.path(), false);
    let app = build_app().await;

    let req = Request::post("/components")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"html":"<h1>Docs</h1><p>Read reviews</p>"}"#))
        .unwrap();
    let (status, body) = text(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains("\"category\":\"SaaS\""));

    let (status, body) = text(&app, Request::get("/metrics").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    for needle in [
        "analysis_requests_total",
        "model_trainings_total",
        "oracle_call_ms",
        "oracle_configured",
    ] {
        assert!(body.contains(needle), "missing series {needle} in:\n{body}");
    }
    assert!(body.contains(r#"mode="oracle""#));
}

#[tokio::test]
#[serial]
async fn health_reflects_test_mode_as_configured() {
    let dir = tempfile::tempdir().unwrap();
    set_env(dir.path(), false);
    let app = build_app().await;

    let (status, body) = text(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["api_key"], "available");
    assert_eq!(v["environment"], "development");
}

#[tokio::test]
#[serial]
async fn production_hides_metrics_and_pins_cors_origin() {
    let dir = tempfile::tempdir().unwrap();
    set_env(dir.path(), true);
    let app = build_app().await;

    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .clone()
        .oneshot(
            Request::get("/health")
                .header(http::header::ORIGIN, "https://app.example.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://app.example.test")
    );

    std::env::remove_var("RAILWAY_ENVIRONMENT");
    std::env::remove_var("FRONTEND_URL");
}
