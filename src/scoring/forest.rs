//! Bagged ensemble of regression trees (random-forest regressor).
//!
//! Trees are grown until leaves are pure or hold fewer than `min_samples_split`
//! rows; splits minimize the summed squared error of the two children. All
//! randomness comes from one seeded `StdRng`, so fitting is reproducible.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::features::FEATURE_COUNT;
use crate::error::ModelError;

pub type FeatureVector = [f64; FEATURE_COUNT];

const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
}

impl RegressionTree {
    fn fit(x: &[FeatureVector], y: &[f64], rows: &mut [usize], min_samples_split: usize) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, rows, min_samples_split.max(2));
        tree
    }

    fn grow(
        &mut self,
        x: &[FeatureVector],
        y: &[f64],
        rows: &mut [usize],
        min_samples_split: usize,
    ) -> usize {
        let id = self.nodes.len();
        let mean = rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len() as f64;
        self.nodes.push(TreeNode::Leaf { value: mean });

        if rows.len() < min_samples_split {
            return id;
        }
        let Some(split) = best_split(x, y, rows) else {
            return id;
        };

        let mut mid = 0;
        for j in 0..rows.len() {
            if x[rows[j]][split.feature] <= split.threshold {
                rows.swap(mid, j);
                mid += 1;
            }
        }
        let (lo, hi) = rows.split_at_mut(mid);
        let left = self.grow(x, y, lo, min_samples_split);
        let right = self.grow(x, y, hi, min_samples_split);
        self.nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    pub fn predict(&self, row: &FeatureVector) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => i = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Best (feature, threshold) by squared-error reduction, or `None` if nothing improves.
fn best_split(x: &[FeatureVector], y: &[f64], rows: &[usize]) -> Option<SplitChoice> {
    let n = rows.len() as f64;
    let total: f64 = rows.iter().map(|&r| y[r]).sum();
    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let parent_sse = total_sq - total * total / n;

    let mut best: Option<(f64, SplitChoice)> = None;
    let mut column: Vec<(f64, f64)> = Vec::with_capacity(rows.len());

    for feature in 0..FEATURE_COUNT {
        column.clear();
        column.extend(rows.iter().map(|&r| (x[r][feature], y[r])));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (mut sum_l, mut sq_l) = (0.0, 0.0);
        for k in 0..column.len() - 1 {
            let (v, target) = column[k];
            sum_l += target;
            sq_l += target * target;
            let next = column[k + 1].0;
            if next <= v {
                continue;
            }
            let n_l = (k + 1) as f64;
            let n_r = n - n_l;
            let sum_r = total - sum_l;
            let sq_r = total_sq - sq_l;
            let sse = (sq_l - sum_l * sum_l / n_l) + (sq_r - sum_r * sum_r / n_r);
            let improves = match &best {
                Some((b, _)) => sse < *b,
                None => true,
            };
            if improves {
                best = Some((
                    sse,
                    SplitChoice {
                        feature,
                        threshold: (v + next) / 2.0,
                    },
                ));
            }
        }
    }

    match best {
        Some((sse, choice)) if parent_sse - sse > MIN_GAIN => Some(choice),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fit `params.n_trees` trees, each on a bootstrap resample of the rows.
    pub fn fit(x: &[FeatureVector], y: &[f64], params: ForestParams) -> Result<Self, ModelError> {
        if x.len() != y.len() {
            return Err(ModelError::LengthMismatch {
                rows: x.len(),
                labels: y.len(),
            });
        }
        if x.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if let Some(bad) = y.iter().find(|v| !v.is_finite()) {
            return Err(ModelError::InvalidScore(bad.to_string()));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let n = x.len();
        let trees = (0..params.n_trees.max(1))
            .map(|_| {
                let mut rows: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                RegressionTree::fit(x, y, &mut rows, params.min_samples_split)
            })
            .collect();

        Ok(Self { params, trees })
    }

    /// Mean of the tree predictions.
    pub fn predict(&self, row: &FeatureVector) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}
