//! Sliding-window transaction anomaly scorer.
//!
//! Every scored transaction is projected to a [`FeatureSample`] and
//! appended to a bounded FIFO buffer. The outlier model is refit on the
//! buffer contents at a fixed cadence, and the new sample is classified
//! against the most recent fit.
//!
//! Fit policy:
//!
//! - while the buffer holds fewer than `min_samples` samples, nothing is
//!   fit and every transaction is non-anomalous (cold start);
//! - the first fit happens on the insertion that reaches `min_samples`;
//! - after that, the model is refit on every `refit_every`-th insertion.
//!
//! On a stationary stream the flag rate stays near `contamination`. A
//! stream whose features drift between refits (rising timestamps, say) is
//! scored against a stale fit and flags more; lower `refit_every` to
//! track it more closely.
//!
//! Append, optional refit, and classification happen under one lock, so
//! concurrent callers are serialized into a single total order.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use super::config::AnomalyConfig;
use super::forest::IsolationForest;
use super::model::{FeatureVector, OutlierModel};
use crate::types::Transaction;

struct ScorerState<M> {
    buffer: VecDeque<FeatureVector>,
    /// Total insertions since construction (not capped by capacity).
    inserted: u64,
    fits: u64,
    model: M,
}

/// Bounded-window anomaly scorer over a pluggable [`OutlierModel`].
pub struct AnomalyScorer<M = IsolationForest> {
    cfg: AnomalyConfig,
    state: Mutex<ScorerState<M>>,
}

impl AnomalyScorer<IsolationForest> {
    /// Scorer backed by a seeded [`IsolationForest`].
    pub fn from_config(cfg: AnomalyConfig) -> Self {
        let model = IsolationForest::from_config(&cfg);
        Self::with_model(cfg, model)
    }
}

impl<M: OutlierModel> AnomalyScorer<M> {
    pub fn with_model(cfg: AnomalyConfig, model: M) -> Self {
        let state = ScorerState {
            buffer: VecDeque::with_capacity(cfg.capacity.min(4096) + 1),
            inserted: 0,
            fits: 0,
            model,
        };
        Self {
            cfg,
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.cfg
    }

    /// Records `tx` and returns `true` if it is anomalous.
    pub fn score(&self, tx: &Transaction) -> bool {
        let sample = tx.features().to_array();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        state.buffer.push_back(sample);
        while state.buffer.len() > self.cfg.capacity {
            state.buffer.pop_front();
        }
        state.inserted += 1;

        if state.buffer.len() < self.cfg.min_samples {
            return false;
        }

        let cadence = self.cfg.refit_every.max(1);
        if !state.model.is_fitted() || state.inserted % cadence == 0 {
            state.model.fit(state.buffer.make_contiguous());
            state.fits += 1;
            debug!(
                samples = state.buffer.len(),
                inserted = state.inserted,
                fits = state.fits,
                "refit anomaly model"
            );
        }

        state.model.is_outlier(&sample)
    }

    /// Number of samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// Number of times the model has been fit.
    pub fn fits(&self) -> u64 {
        self.state.lock().fits
    }
}
