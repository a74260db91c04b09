use serde::Deserialize;

use crate::types::MAINNET;

/// Anomaly scorer parameters.
///
/// The refit cadence and seed are pinned here so that replaying the same
/// ordered transaction stream always produces the same verdicts.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Maximum number of feature samples kept (oldest evicted first).
    pub capacity: usize,
    /// Samples required before any transaction can be flagged.
    pub min_samples: usize,
    /// Refit the model on every `refit_every`-th insertion.
    pub refit_every: u64,
    /// Seed for the model's random number generator.
    pub seed: u64,
    /// Number of isolation trees.
    pub n_trees: usize,
    /// Samples drawn (without replacement) to grow each tree.
    pub subsample_size: usize,
    /// Expected share of outliers in the training window, in `(0, 0.5]`.
    pub contamination: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            min_samples: 30,
            refit_every: 100,
            seed: 42,
            n_trees: 100,
            subsample_size: 256,
            contamination: 0.01,
        }
    }
}

/// Sidechain admission parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SidechainConfig {
    /// Origin chains allowed to submit transactions.
    pub authorized_chains: Vec<String>,
    /// Also run native (mainnet) transactions through the anomaly scorer.
    pub screen_mainnet: bool,
}

impl Default for SidechainConfig {
    fn default() -> Self {
        Self {
            authorized_chains: vec![MAINNET.to_string(), "sidechain_1".to_string()],
            screen_mainnet: false,
        }
    }
}
