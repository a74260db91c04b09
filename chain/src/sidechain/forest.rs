//! Seeded isolation forest.
//!
//! Each tree recursively splits a random subsample on a random feature at
//! a uniformly random threshold until points are isolated or the height
//! limit `ceil(log2(subsample))` is reached. Points that isolate quickly
//! (short average path length) are outliers. The decision threshold is
//! the `1 - contamination` quantile of the training scores.
//!
//! All randomness comes from one `ChaCha8Rng` seeded at construction, so
//! the same sequence of fits yields the same trees.

use rand::Rng;
use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::config::AnomalyConfig;
use super::model::{FeatureVector, OutlierModel};
use crate::types::FeatureSample;

/// Euler–Mascheroni constant, for the harmonic number approximation.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug)]
struct Fitted {
    trees: Vec<Node>,
    /// Normaliser `c(subsample)`.
    norm: f64,
    threshold: f64,
}

/// Isolation forest implementing [`OutlierModel`].
#[derive(Debug)]
pub struct IsolationForest {
    n_trees: usize,
    subsample_size: usize,
    contamination: f64,
    rng: ChaCha8Rng,
    fitted: Option<Fitted>,
}

impl IsolationForest {
    pub fn new(n_trees: usize, subsample_size: usize, contamination: f64, seed: u64) -> Self {
        Self {
            n_trees: n_trees.max(1),
            subsample_size: subsample_size.max(2),
            contamination,
            rng: ChaCha8Rng::seed_from_u64(seed),
            fitted: None,
        }
    }

    pub fn from_config(cfg: &AnomalyConfig) -> Self {
        Self::new(cfg.n_trees, cfg.subsample_size, cfg.contamination, cfg.seed)
    }

    /// Anomaly score in `(0, 1]`; higher is more anomalous. `None` before
    /// the first fit.
    pub fn score(&self, sample: &FeatureVector) -> Option<f64> {
        self.fitted.as_ref().map(|f| score_with(f, sample))
    }

    /// Decision threshold of the current fit.
    pub fn threshold(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.threshold)
    }

    fn grow(&mut self, samples: &[FeatureVector], idx: &mut [usize], depth: usize, limit: usize) -> Node {
        if depth >= limit || idx.len() <= 1 {
            return Node::Leaf { size: idx.len() };
        }

        // Only features that still vary within this node can split it.
        let mut candidates: Vec<(usize, f64, f64)> = Vec::with_capacity(FeatureSample::WIDTH);
        for feature in 0..FeatureSample::WIDTH {
            let (lo, hi) = idx.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                let v = samples[i][feature];
                (lo.min(v), hi.max(v))
            });
            if hi > lo {
                candidates.push((feature, lo, hi));
            }
        }
        if candidates.is_empty() {
            return Node::Leaf { size: idx.len() };
        }

        let (feature, lo, hi) = candidates[self.rng.gen_range(0..candidates.len())];
        let threshold = self.rng.gen_range(lo..hi);

        // Partition in place: `< threshold` to the left.
        let mut mid = 0;
        for j in 0..idx.len() {
            if samples[idx[j]][feature] < threshold {
                idx.swap(mid, j);
                mid += 1;
            }
        }

        let (left_idx, right_idx) = idx.split_at_mut(mid);
        let left = self.grow(samples, left_idx, depth + 1, limit);
        let right = self.grow(samples, right_idx, depth + 1, limit);

        Node::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl OutlierModel for IsolationForest {
    fn fit(&mut self, samples: &[FeatureVector]) {
        if samples.len() < 2 {
            self.fitted = None;
            return;
        }

        let psi = self.subsample_size.min(samples.len());
        let limit = (psi as f64).log2().ceil() as usize;

        let mut trees = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let mut idx = index::sample(&mut self.rng, samples.len(), psi).into_vec();
            trees.push(self.grow(samples, &mut idx, 0, limit));
        }

        let mut fitted = Fitted {
            trees,
            norm: average_path_length(psi),
            threshold: f64::INFINITY,
        };

        let mut scores: Vec<f64> = samples.iter().map(|s| score_with(&fitted, s)).collect();
        scores.sort_by(f64::total_cmp);
        fitted.threshold = quantile(&scores, 1.0 - self.contamination);

        debug!(
            samples = samples.len(),
            trees = self.n_trees,
            subsample = psi,
            threshold = fitted.threshold,
            "fitted isolation forest"
        );

        self.fitted = Some(fitted);
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn is_outlier(&self, sample: &FeatureVector) -> bool {
        match &self.fitted {
            Some(f) => score_with(f, sample) > f.threshold,
            None => false,
        }
    }
}

fn score_with(fitted: &Fitted, sample: &FeatureVector) -> f64 {
    if fitted.norm <= 0.0 || fitted.trees.is_empty() {
        return 0.0;
    }
    let total: f64 = fitted.trees.iter().map(|t| path_length(t, sample, 0)).sum();
    let mean = total / fitted.trees.len() as f64;
    2f64.powf(-mean / fitted.norm)
}

fn path_length(node: &Node, sample: &FeatureVector, depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            let next = if sample[*feature] < *threshold { left } else { right };
            path_length(next, sample, depth + 1)
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::INFINITY;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(n: usize) -> Vec<FeatureVector> {
        (0..n)
            .map(|i| {
                let i = i as f64;
                [1_000.0 + (i * 7.0) % 50.0, 10.0 + (i * 3.0) % 5.0, (i * 131.0) % 997.0]
            })
            .collect()
    }

    #[test]
    fn unfitted_forest_flags_nothing() {
        let f = IsolationForest::new(10, 64, 0.01, 1);
        assert!(!f.is_fitted());
        assert!(!f.is_outlier(&[1e12, 1e6, 1.0]));
        assert_eq!(f.score(&[0.0, 0.0, 0.0]), None);
    }

    #[test]
    fn isolated_point_is_flagged() {
        let mut data = cluster(99);
        let outlier = [5_000_000.0, 900.0, 999_999.0];
        data.push(outlier);

        let mut f = IsolationForest::new(100, 256, 0.01, 7);
        f.fit(&data);

        assert!(f.is_outlier(&outlier));
        let normal = data[10];
        assert!(f.score(&outlier).unwrap() > f.score(&normal).unwrap());
    }

    #[test]
    fn same_seed_same_scores() {
        let data = cluster(120);
        let mut a = IsolationForest::new(50, 64, 0.05, 99);
        let mut b = IsolationForest::new(50, 64, 0.05, 99);
        a.fit(&data);
        b.fit(&data);

        for s in &data {
            assert_eq!(a.score(s), b.score(s));
        }
        assert_eq!(a.threshold(), b.threshold());
    }

    #[test]
    fn identical_points_never_split() {
        let data = vec![[1.0, 2.0, 3.0]; 40];
        let mut f = IsolationForest::new(10, 32, 0.01, 3);
        f.fit(&data);
        // Every point sits in the same leaf: equal scores, none above the
        // threshold.
        assert!(!f.is_outlier(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn average_path_length_matches_known_values() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!((c256 - 10.2447).abs() < 1e-3, "c(256) = {c256}");
    }

    #[test]
    fn quantile_interpolates() {
        let s = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&s, 0.5), 2.0);
        assert_eq!(quantile(&s, 1.0), 4.0);
        assert!((quantile(&s, 0.9) - 3.6).abs() < 1e-12);
    }
}
