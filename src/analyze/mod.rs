// src/analyze/mod.rs
//! Analysis orchestrator: category → components → suggestions against the oracle.
//!
//! Every stage degrades to canned content instead of failing, so `analyze` always
//! produces a complete `AnalysisResult`. Image inputs additionally get a keyword
//! sentiment score because there is no HTML to feed the scoring model.

pub mod ai_adapter;
pub mod fallback;
pub mod heuristic;
pub mod parse;
pub mod prompts;
pub mod staged;
pub mod types;

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::acquire::{anon_hash, AnalysisInput, ImagePayload};
use crate::error::OracleError;
use crate::metrics::{ORACLE_CALL_MS, ORACLE_FALLBACKS};

pub use ai_adapter::{DynOracle, Oracle, OracleRequest, Stage};
pub use staged::{FallbackReason, Staged};
pub use types::{
    AnalysisResult, ComponentAnalysis, ComponentCategory, Observations, SuggestionSet, Suggestions,
};

pub struct Orchestrator {
    oracle: Option<DynOracle>,
}

impl Orchestrator {
    pub fn new(oracle: Option<DynOracle>) -> Self {
        Self { oracle }
    }

    /// Orchestrator without an oracle; every call yields demo content.
    pub fn demo() -> Self {
        Self { oracle: None }
    }

    pub fn is_configured(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn provider_name(&self) -> &'static str {
        self.oracle
            .as_ref()
            .map(|o| o.provider_name())
            .unwrap_or("disabled")
    }

    /// Full pipeline for one normalized input.
    ///
    /// `website_score` is the model score for page inputs; image inputs overwrite it
    /// with the heuristic score.
    pub async fn analyze(
        &self,
        input: &AnalysisInput,
        source: impl Into<String>,
        website_score: Option<f64>,
    ) -> AnalysisResult {
        if !self.is_configured() {
            return match input {
                AnalysisInput::Page { .. } => fallback::demo_result(),
                AnalysisInput::Image(_) => fallback::image_demo_result(),
            };
        }
        let id = input_id(input);
        let category = self.detect_category(input).await;
        note(Stage::Category, &category, &id);
        let category = category.into_value();

        let analysis = self.extract_components(input, &category).await;
        note(Stage::Components, &analysis, &id);
        let analysis = analysis.into_value();

        let suggestions = self.generate_suggestions(&analysis, &category).await;
        note(Stage::Suggestions, &suggestions, &id);
        let suggestions = suggestions.into_value();

        let website_score = match input {
            AnalysisInput::Page { .. } => website_score,
            AnalysisInput::Image(_) => Some(heuristic::image_score(&analysis)),
        };

        debug!(%id, input = input.kind(), %category, ?website_score, "analysis finished");
        AnalysisResult {
            source: source.into(),
            category,
            analysis,
            suggestions,
            website_score,
            demo: None,
            error: None,
        }
    }

    pub async fn detect_category(&self, input: &AnalysisInput) -> Staged<String> {
        let Some(oracle) = self.oracle.as_deref() else {
            return Staged::fallback(fallback::UNKNOWN_CATEGORY_DEMO.to_string(), FallbackReason::Demo);
        };
        let (prompt, image) = match input {
            AnalysisInput::Page { text, .. } => (prompts::category_from_text(text), None),
            AnalysisInput::Image(img) => (prompts::category_from_image(), Some(img)),
        };

        match call(oracle, Stage::Category, prompt, image).await {
            Ok(text) => {
                let label = text.trim();
                if label.is_empty() {
                    Staged::Fresh(fallback::UNKNOWN_CATEGORY.to_string())
                } else {
                    Staged::Fresh(label.to_string())
                }
            }
            Err(e) => Staged::fallback(
                fallback::UNKNOWN_CATEGORY_API_ERROR.to_string(),
                FallbackReason::Oracle(e),
            ),
        }
    }

    pub async fn extract_components(
        &self,
        input: &AnalysisInput,
        category: &str,
    ) -> Staged<ComponentAnalysis> {
        let Some(oracle) = self.oracle.as_deref() else {
            return Staged::fallback(fallback::stage_demo_components(), FallbackReason::Demo);
        };
        let (prompt, image) = match input {
            AnalysisInput::Page { text, .. } => (prompts::components_from_text(text, category), None),
            AnalysisInput::Image(img) => (prompts::components_from_image(category), Some(img)),
        };

        let text = match call(oracle, Stage::Components, prompt, image).await {
            Ok(text) => text,
            Err(e) => {
                return Staged::fallback(
                    fallback::components_unavailable(),
                    FallbackReason::Oracle(e),
                )
            }
        };
        match parse::parse_with(&text, ComponentAnalysis::from_value) {
            Ok(analysis) => Staged::Fresh(analysis),
            Err(e) => Staged::fallback(
                fallback::components_unparsed(image.is_some()),
                FallbackReason::Parse(e),
            ),
        }
    }

    pub async fn generate_suggestions(
        &self,
        analysis: &ComponentAnalysis,
        category: &str,
    ) -> Staged<SuggestionSet> {
        let Some(oracle) = self.oracle.as_deref() else {
            return Staged::fallback(fallback::stage_demo_suggestions(), FallbackReason::Demo);
        };
        let analysis_json = serde_json::to_string(analysis).unwrap_or_else(|_| "{}".to_string());
        let prompt = prompts::suggestions(&analysis_json, category);

        match call(oracle, Stage::Suggestions, prompt, None).await {
            Ok(text) => match parse::parse_with(&text, SuggestionSet::from_value) {
                Ok(set) => Staged::Fresh(set),
                Err(e) => Staged::fallback(fallback::suggestions_fallback(), FallbackReason::Parse(e)),
            },
            Err(e) => Staged::fallback(fallback::suggestions_fallback(), FallbackReason::Oracle(e)),
        }
    }
}

async fn call(
    oracle: &dyn Oracle,
    stage: Stage,
    prompt: String,
    image: Option<&ImagePayload>,
) -> Result<String, OracleError> {
    let t0 = Instant::now();
    let request = OracleRequest {
        stage,
        prompt,
        image,
    };
    let out = oracle.generate(&request).await;
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!(ORACLE_CALL_MS, "stage" => stage.as_str()).record(ms);
    out
}

/// Log and count a stage fallback. Fresh results are silent.
fn note<T>(stage: Stage, staged: &Staged<T>, id: &str) {
    if let Some(reason) = staged.reason() {
        warn!(%id, stage = stage.as_str(), %reason, "oracle stage fell back to canned content");
        counter!(ORACLE_FALLBACKS, "stage" => stage.as_str(), "reason" => reason.label())
            .increment(1);
    }
}

fn input_id(input: &AnalysisInput) -> String {
    match input {
        AnalysisInput::Page { text, .. } => anon_hash(text),
        AnalysisInput::Image(img) => anon_hash(&img.data),
    }
}
