//! Isolation forest over a single numeric feature.
//!
//! Each tree recursively splits a random subsample at uniformly drawn
//! thresholds. Outliers end up isolated near the root, so their average
//! path length is short. Scores follow the usual normalisation
//! `s = 2^(-E[h] / c(psi))`; with automatic contamination a point is an
//! outlier when `s > 0.5`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::DetectError;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Subsample cap used when `max_samples` is left automatic.
pub const AUTO_MAX_SAMPLES: usize = 256;

/// Score above which a point is flagged (automatic contamination).
pub const AUTO_THRESHOLD: f64 = 0.5;

/// Scores this close to the threshold are ties and stay unflagged.
const SCORE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    pub trees: usize,
    /// None = min(256, n)
    pub max_samples: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self { trees: 100, max_samples: None, seed: 42 }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split { threshold: f64, left: usize, right: usize },
    Leaf { size: usize },
}

/// Arena-allocated isolation tree; node 0 is the root.
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build(sample: Vec<f64>, height_limit: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(sample, 0, height_limit, rng);
        tree
    }

    fn grow(&mut self, values: Vec<f64>, depth: usize, height_limit: usize, rng: &mut StdRng) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: values.len() });

        if values.len() <= 1 || depth >= height_limit {
            return id;
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        // Constant node: nothing left to split on
        if min >= max {
            return id;
        }

        // Convex combination stays finite even when max - min overflows
        let u: f64 = rng.gen();
        let threshold = min * (1.0 - u) + max * u;
        let (lower, upper): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|&v| v <= threshold);

        let left = self.grow(lower, depth + 1, height_limit, rng);
        let right = self.grow(upper, depth + 1, height_limit, rng);
        self.nodes[id] = Node::Split { threshold, left, right };
        id
    }

    /// Depth of the leaf `x` lands in, plus the expected remaining
    /// depth for the samples sharing that leaf.
    fn path_length(&self, x: f64) -> f64 {
        let mut node = 0;
        let mut depth = 0usize;
        loop {
            match self.nodes[node] {
                Node::Split { threshold, left, right } => {
                    node = if x <= threshold { left } else { right };
                    depth += 1;
                }
                Node::Leaf { size } => return depth as f64 + average_path_length(size),
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    params: ForestParams,
}

impl IsolationForest {
    /// Fit on `values`. The same values and seed always build the same forest.
    pub fn fit(values: &[f64], params: ForestParams) -> Result<Self, DetectError> {
        if values.is_empty() {
            return Err(DetectError::EmptyInput);
        }

        let n = values.len();
        let sample_size = params.max_samples.unwrap_or(AUTO_MAX_SAMPLES).clamp(1, n);
        let height_limit = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        log::debug!(
            "Fitting isolation forest: {} trees, {} of {} samples per tree, height limit {}",
            params.trees, sample_size, n, height_limit,
        );

        let trees = (0..params.trees.max(1))
            .map(|_| {
                let sample: Vec<f64> = rand::seq::index::sample(&mut rng, n, sample_size)
                    .into_iter()
                    .map(|i| values[i])
                    .collect();
                IsolationTree::build(sample, height_limit, &mut rng)
            })
            .collect();

        Ok(Self { trees, sample_size, params })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Anomaly score in (0, 1]; higher is more anomalous.
    pub fn score(&self, x: f64) -> f64 {
        let mean_path = self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);
        // Single-sample forests have c(psi) = 0; score them as undecided.
        let ratio = if norm == 0.0 { 1.0 } else { mean_path / norm };
        2f64.powf(-ratio)
    }

    pub fn scores(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&x| self.score(x)).collect()
    }

    /// One flag per value: true = outlier.
    pub fn predict(&self, values: &[f64]) -> Vec<bool> {
        values
            .iter()
            .map(|&x| self.score(x) > AUTO_THRESHOLD + SCORE_TOLERANCE)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_path_length_values() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c5 = average_path_length(5);
        assert!((c5 - 2.327).abs() < 1e-3, "c(5) = {c5}");
        let c256 = average_path_length(256);
        assert!((c256 - 10.244).abs() < 1e-2, "c(256) = {c256}");
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = IsolationForest::fit(&[], ForestParams::default()).unwrap_err();
        assert_eq!(err, DetectError::EmptyInput);
    }

    #[test]
    fn test_days_since_offer_outlier_flagged() {
        let values = [2.0, 3.0, 2.0, 3.0, 95.0];
        let forest = IsolationForest::fit(&values, ForestParams::default()).unwrap();
        assert_eq!(forest.predict(&values), vec![false, false, false, false, true]);
    }

    #[test]
    fn test_constant_column_flags_nothing() {
        let values = [7.0; 12];
        let forest = IsolationForest::fit(&values, ForestParams::default()).unwrap();
        for s in forest.scores(&values) {
            assert!((s - 0.5).abs() < 1e-12, "score {s}");
        }
        assert!(forest.predict(&values).iter().all(|f| !f));
    }

    #[test]
    fn test_single_value_is_not_flagged() {
        let forest = IsolationForest::fit(&[10.0], ForestParams::default()).unwrap();
        assert_eq!(forest.sample_size(), 1);
        assert_eq!(forest.score(10.0), 0.5);
        assert_eq!(forest.predict(&[10.0]), vec![false]);
    }

    #[test]
    fn test_lone_spike_in_flat_column() {
        let mut values = vec![10.0; 50];
        values.push(500.0);
        let forest = IsolationForest::fit(&values, ForestParams::default()).unwrap();
        let flags = forest.predict(&values);
        assert!(flags[50]);
        assert_eq!(flags.iter().filter(|f| **f).count(), 1);
    }

    #[test]
    fn test_same_seed_same_flags() {
        let values: Vec<f64> = (0..300).map(|i| ((i * 37) % 101) as f64).chain([900.0, -400.0]).collect();
        let a = IsolationForest::fit(&values, ForestParams::default()).unwrap();
        let b = IsolationForest::fit(&values, ForestParams::default()).unwrap();
        assert_eq!(a.scores(&values), b.scores(&values));
        assert_eq!(a.predict(&values), b.predict(&values));
    }

    #[test]
    fn test_auto_max_samples_caps_at_256() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let forest = IsolationForest::fit(&values, ForestParams::default()).unwrap();
        assert_eq!(forest.sample_size(), 256);
    }

    #[test]
    fn test_explicit_max_samples_clamped_to_rows() {
        let params = ForestParams { max_samples: Some(500), ..ForestParams::default() };
        let forest = IsolationForest::fit(&[1.0, 2.0, 3.0], params).unwrap();
        assert_eq!(forest.sample_size(), 3);
    }

    #[test]
    fn test_scores_are_in_unit_interval() {
        let values = [1.0, 4.0, 4.5, 5.0, 5.5, 6.0, 40.0];
        let forest = IsolationForest::fit(&values, ForestParams { trees: 25, ..ForestParams::default() }).unwrap();
        for s in forest.scores(&values) {
            assert!(s > 0.0 && s <= 1.0, "score out of range: {s}");
        }
    }
}
