//! Oracle adapter: provider abstraction over the generative-language service.
//!
//! Oracles are opaque prompt(+image) → free text functions. Nothing here interprets
//! the text; JSON recovery lives in `analyze::parse`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::acquire::ImagePayload;
use crate::config::{AiConfig, TestMode};
use crate::error::OracleError;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Which orchestration step a call belongs to. Used by test doubles and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Category,
    Components,
    Suggestions,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Components => "components",
            Self::Suggestions => "suggestions",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OracleRequest<'a> {
    pub stage: Stage,
    pub prompt: String,
    pub image: Option<&'a ImagePayload>,
}

pub type OracleFuture<'a> = Pin<Box<dyn Future<Output = Result<String, OracleError>> + Send + 'a>>;

/// Text-in/text-out generative service.
pub trait Oracle: Send + Sync {
    fn generate<'a>(&'a self, request: &'a OracleRequest<'a>) -> OracleFuture<'a>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynOracle = Arc<dyn Oracle>;

/// Factory: build an oracle according to config.
///
/// * `AI_TEST_MODE=mock` → deterministic [`MockOracle`].
/// * `AI_TEST_MODE=error` → [`FailingOracle`].
/// * credential present → [`GeminiOracle`].
/// * otherwise `None`, i.e. demo mode.
pub fn build_oracle(config: &AiConfig) -> Result<Option<DynOracle>, OracleError> {
    match config.test_mode {
        Some(TestMode::Mock) => return Ok(Some(Arc::new(MockOracle::default()))),
        Some(TestMode::Error) => return Ok(Some(Arc::new(FailingOracle::default()))),
        None => {}
    }

    match config.api_key.as_deref() {
        Some(key) => {
            let oracle = GeminiOracle::new(key, &config.model)?;
            Ok(Some(Arc::new(oracle)))
        }
        None => Ok(None),
    }
}

// ------------------------------------------------------------
// Gemini provider
// ------------------------------------------------------------

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Generative Language API (`generateContent`). No retries and no request
/// timeout; a failed call is reported once and the caller falls back.
pub struct GeminiOracle {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiOracle {
    pub fn new(api_key: &str, model: &str) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("website-analyzer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point at a different host (proxies, local emulators).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

fn build_body<'a>(request: &'a OracleRequest<'a>) -> GenerateRequest<'a> {
    let mut parts = vec![Part::Text {
        text: &request.prompt,
    }];
    if let Some(img) = request.image {
        parts.push(Part::Inline {
            inline_data: InlineData {
                mime_type: &img.mime_type,
                data: &img.data,
            },
        });
    }
    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(resp: GenerateResponse) -> Option<String> {
    let content = resp.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

impl Oracle for GeminiOracle {
    fn generate<'a>(&'a self, request: &'a OracleRequest<'a>) -> OracleFuture<'a> {
        Box::pin(async move {
            let body = build_body(request);
            let resp = self
                .http
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| OracleError::Transport(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(OracleError::Status(resp.status().as_u16()));
            }
            let parsed: GenerateResponse = resp
                .json()
                .await
                .map_err(|e| OracleError::Transport(e.to_string()))?;
            response_text(parsed).ok_or(OracleError::EmptyResponse)
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// Test doubles
// ------------------------------------------------------------

/// Deterministic offline oracle with well-formed answers for every stage.
#[derive(Clone)]
pub struct MockOracle {
    pub category: String,
    pub components: String,
    pub suggestions: String,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self {
            category: "SaaS".to_string(),
            components: serde_json::json!({
                "cta": {"observations": [
                    "Primary CTA is clear and visible above the fold",
                    "Secondary CTAs lack contrast"
                ]},
                "visual_hierarchy": {"observations": [
                    "Headline is prominent and well sized"
                ]},
                "copy_effectiveness": {"observations": [
                    "Value proposition is clear",
                    "Feature list could be shorter"
                ]},
                "trust_signals": {"observations": [
                    "Missing customer testimonials"
                ]}
            })
            .to_string(),
            suggestions: serde_json::json!({
                "cta": {
                    "high_priority": ["Increase contrast of secondary CTAs", "Use a single primary action per section"],
                    "additional": ["A/B test CTA wording"]
                },
                "visual_hierarchy": {
                    "high_priority": ["Group related features under subheadings", "Reduce competing accent colors"],
                    "additional": ["Add whitespace around the hero"]
                },
                "copy_effectiveness": {
                    "high_priority": ["Trim the feature list to the top five", "Lead with customer outcomes"],
                    "additional": ["Shorten paragraphs"]
                },
                "trust_signals": {
                    "high_priority": ["Add customer testimonials", "Show recognizable customer logos"],
                    "additional": ["Link to a security page"]
                }
            })
            .to_string(),
        }
    }
}

impl Oracle for MockOracle {
    fn generate<'a>(&'a self, request: &'a OracleRequest<'a>) -> OracleFuture<'a> {
        let out = match request.stage {
            Stage::Category => self.category.clone(),
            Stage::Components => self.components.clone(),
            Stage::Suggestions => self.suggestions.clone(),
        };
        Box::pin(async move { Ok(out) })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Fails every call; exercises the fallback paths end to end.
#[derive(Clone)]
pub struct FailingOracle {
    pub message: String,
}

impl Default for FailingOracle {
    fn default() -> Self {
        Self {
            message: "simulated provider outage".to_string(),
        }
    }
}

impl Oracle for FailingOracle {
    fn generate<'a>(&'a self, _request: &'a OracleRequest<'a>) -> OracleFuture<'a> {
        let err = OracleError::Scripted(self.message.clone());
        Box::pin(async move { Err(err) })
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

type Script = dyn Fn(&OracleRequest<'_>) -> Result<String, OracleError> + Send + Sync;

/// Oracle driven by a closure, for tests that need per-stage control.
pub struct ScriptedOracle {
    script: Box<Script>,
}

impl ScriptedOracle {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&OracleRequest<'_>) -> Result<String, OracleError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
        }
    }
}

impl Oracle for ScriptedOracle {
    fn generate<'a>(&'a self, request: &'a OracleRequest<'a>) -> OracleFuture<'a> {
        let out = (self.script)(request);
        Box::pin(async move { out })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_honours_test_modes_and_missing_key() {
        let mut cfg = AiConfig::disabled();
        assert!(build_oracle(&cfg).unwrap().is_none());

        cfg.test_mode = Some(TestMode::Mock);
        let o = build_oracle(&cfg).unwrap().expect("mock oracle");
        assert_eq!(o.provider_name(), "mock");

        cfg.test_mode = Some(TestMode::Error);
        let o = build_oracle(&cfg).unwrap().expect("failing oracle");
        assert_eq!(o.provider_name(), "failing");

        cfg.test_mode = None;
        cfg.api_key = Some("k".into());
        let o = build_oracle(&cfg).unwrap().expect("gemini oracle");
        assert_eq!(o.provider_name(), "gemini");
    }

    #[test]
    fn request_body_carries_inline_image() {
        let img = ImagePayload {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        };
        let req = OracleRequest {
            stage: Stage::Category,
            prompt: "what is this".into(),
            image: Some(&img),
        };
        let v = serde_json::to_value(build_body(&req)).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "what is this");
        assert_eq!(v["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(v["contents"][0]["parts"][1]["inline_data"]["data"], "AAAA");
    }

    #[test]
    fn response_text_joins_parts_and_rejects_blank() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"E-"},{"text":"commerce"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(resp).as_deref(), Some("E-commerce"));

        let blank: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert!(response_text(blank).is_none());

        let none: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(response_text(none).is_none());
    }

    #[tokio::test]
    async fn mock_answers_by_stage() {
        let mock = MockOracle::default();
        let req = OracleRequest {
            stage: Stage::Category,
            prompt: String::new(),
            image: None,
        };
        assert_eq!(mock.generate(&req).await.unwrap(), "SaaS");
    }
}
