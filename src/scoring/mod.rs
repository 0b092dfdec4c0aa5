// src/scoring/mod.rs
//! Website score: structural HTML features → persisted regression forest → 0..=100.
//!
//! The model has two states. With nothing in the store it is *uninitialized* and
//! the first prediction fits a dummy forest on a seeded synthetic set. Every
//! feedback call replaces the stored forest with one fit on that single example.

pub mod features;
pub mod forest;
pub mod store;

use std::sync::Arc;

use metrics::counter;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ModelError, ValidationError};
use crate::metrics::MODEL_TRAININGS;

pub use features::{extract_features, normalize_vector, ScoreFeatures, FEATURE_COUNT};
pub use forest::{FeatureVector, ForestParams, RandomForest};
pub use store::{FileModelStore, MemoryModelStore, ModelOrigin, ModelRecord, ModelStore};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

const SYNTHETIC_ROWS: usize = 100;
const SYNTHETIC_SEED: u64 = 42;
const SYNTHETIC_WEIGHTS: [f64; FEATURE_COUNT] = [8.0, 7.0, 5.0, 5.0, 10.0];
/// Per-feature maxima used to normalize the weighted sum.
const SYNTHETIC_CEILING: [f64; FEATURE_COUNT] = [5.0, 15.0, 20.0, 3.0, 1.0];
/// Half-open integer ranges `[lo, hi)` per feature.
const SYNTHETIC_RANGES: [(u32, u32); FEATURE_COUNT] = [(0, 6), (0, 15), (1, 20), (0, 4), (0, 2)];
const SYNTHETIC_BASE: f64 = 40.0;
const SYNTHETIC_SPAN: f64 = 60.0;

/// Seeded synthetic training set for the dummy model.
pub fn synthetic_training_set() -> (Vec<FeatureVector>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(SYNTHETIC_SEED);
    let max_possible: f64 = dot(&SYNTHETIC_WEIGHTS, &SYNTHETIC_CEILING);

    let x: Vec<FeatureVector> = (0..SYNTHETIC_ROWS)
        .map(|_| {
            let mut row = [0.0; FEATURE_COUNT];
            for (slot, (lo, hi)) in row.iter_mut().zip(SYNTHETIC_RANGES) {
                *slot = f64::from(rng.random_range(lo..hi));
            }
            row
        })
        .collect();
    let y = x
        .iter()
        .map(|row| SYNTHETIC_BASE + dot(row, &SYNTHETIC_WEIGHTS) / max_possible * SYNTHETIC_SPAN)
        .collect();
    (x, y)
}

fn dot(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
    a.iter().zip(b).map(|(p, q)| p * q).sum()
}

/// Exactly one of a raw feature vector or an HTML document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreInput<'a> {
    /// Any length; padded or truncated to five.
    Features(&'a [f64]),
    Html(&'a str),
}

impl<'a> ScoreInput<'a> {
    /// An empty HTML string counts as absent.
    pub fn from_parts(
        features: Option<&'a [f64]>,
        html: Option<&'a str>,
    ) -> Result<Self, ValidationError> {
        match (features, html.filter(|h| !h.is_empty())) {
            (Some(f), None) => Ok(Self::Features(f)),
            (None, Some(h)) => Ok(Self::Html(h)),
            _ => Err(ValidationError::new(
                "Either features or HTML must be provided",
            )),
        }
    }

    fn vector(&self) -> FeatureVector {
        match self {
            Self::Features(f) => normalize_vector(f),
            Self::Html(h) => extract_features(h).to_vector(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingOutcome {
    pub old_score: f64,
    pub new_score: f64,
    pub model_updated: bool,
    pub features: ScoreFeatures,
}

pub struct ScoringModel {
    store: Arc<dyn ModelStore>,
    params: ForestParams,
}

impl ScoringModel {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self::with_params(store, ForestParams::default())
    }

    pub fn with_params(store: Arc<dyn ModelStore>, params: ForestParams) -> Self {
        Self { store, params }
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Startup hook. With `reset` the stored model is discarded and the dummy refit.
    pub fn ensure_initialized(&self, reset: bool) -> Result<ModelOrigin, ModelError> {
        if reset {
            self.store.clear()?;
        }
        let record = self.current()?;
        info!(
            location = %self.store.location(),
            origin = ?record.origin,
            samples = record.samples,
            "scoring model ready"
        );
        Ok(record.origin)
    }

    pub fn fit_dummy(&self) -> Result<ModelRecord, ModelError> {
        let (x, y) = synthetic_training_set();
        let forest = RandomForest::fit(&x, &y, self.params)?;
        let record = ModelRecord::new(ModelOrigin::Dummy, x.len(), forest);
        self.store.save(&record)?;
        counter!(MODEL_TRAININGS, "outcome" => "dummy").increment(1);
        Ok(record)
    }

    /// Stored model, fitting the dummy first when the store is empty or unreadable.
    fn current(&self) -> Result<ModelRecord, ModelError> {
        match self.store.load() {
            Ok(Some(record)) => Ok(record),
            Ok(None) => self.fit_dummy(),
            Err(ModelError::Serde(e)) => {
                warn!(location = %self.store.location(), error = %e, "stored model unreadable, refitting dummy");
                self.fit_dummy()
            }
            Err(e) => Err(e),
        }
    }

    pub fn predict_score(&self, input: ScoreInput<'_>) -> Result<f64, ModelError> {
        let record = self.current()?;
        Ok(clamp_score(record.forest.predict(&input.vector())))
    }

    pub fn score_html(&self, html: &str) -> Result<f64, ModelError> {
        self.predict_score(ScoreInput::Html(html))
    }

    /// Refit on the single `(features(html), user_score)` pair and persist it.
    pub fn train_from_feedback(
        &self,
        html: &str,
        user_score: f64,
    ) -> Result<TrainingOutcome, ModelError> {
        if !user_score.is_finite() {
            counter!(MODEL_TRAININGS, "outcome" => "rejected").increment(1);
            return Err(ModelError::InvalidScore(user_score.to_string()));
        }
        let features = extract_features(html);
        let row = features.to_vector();
        let old_score = clamp_score(self.current()?.forest.predict(&row));

        let forest = RandomForest::fit(&[row], &[user_score], self.params)?;
        let new_score = clamp_score(forest.predict(&row));
        self.store
            .save(&ModelRecord::new(ModelOrigin::Feedback, 1, forest))?;
        counter!(MODEL_TRAININGS, "outcome" => "feedback").increment(1);

        Ok(TrainingOutcome {
            old_score,
            new_score,
            model_updated: true,
            features,
        })
    }
}

pub fn clamp_score(raw: f64) -> f64 {
    raw.clamp(SCORE_MIN, SCORE_MAX)
}
