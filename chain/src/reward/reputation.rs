//! Per-miner solve-time history and the reward multiplier derived from it.
//!
//! Each miner keeps a rolling window of its most recent solve-times. A
//! full window whose mean is below the fast threshold marks a suspected
//! high-hashrate farm and earns the minimum factor; a mean above the slow
//! threshold earns the maximum factor. Everything else, including any
//! miner without a full window yet, is neutral.
//!
//! At most `max_tracked_miners` windows are kept. Recording a solve-time
//! for a new miner at the limit forgets the least recently active one.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::config::ReputationConfig;
use crate::types::MinerId;

/// Reputation bucket a miner currently falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Multiplier {
    /// Mean solve-time below the fast threshold.
    MinFactor,
    /// Mean solve-time above the slow threshold.
    MaxFactor,
    /// Not enough history, or mean within the thresholds.
    Neutral,
}

#[derive(Debug, Default)]
struct MinerRecord {
    solve_times: VecDeque<u64>,
    last_active: u64,
}

#[derive(Debug, Default)]
struct Records {
    miners: HashMap<MinerId, MinerRecord>,
    clock: u64,
}

impl Records {
    fn evict_least_recent(&mut self) -> Option<MinerId> {
        let oldest = self
            .miners
            .iter()
            .min_by_key(|(_, r)| r.last_active)
            .map(|(id, _)| id.clone())?;
        self.miners.remove(&oldest);
        Some(oldest)
    }
}

/// Rolling solve-time windows keyed by miner identity.
///
/// All updates to one miner's window happen under the write lock, so a
/// concurrent reader never observes a half-applied append/evict.
#[derive(Debug)]
pub struct MinerReputationTracker {
    cfg: ReputationConfig,
    records: RwLock<Records>,
}

impl MinerReputationTracker {
    pub fn new(cfg: ReputationConfig) -> Self {
        Self {
            cfg,
            records: RwLock::new(Records::default()),
        }
    }

    pub fn config(&self) -> &ReputationConfig {
        &self.cfg
    }

    /// Appends a solve-time, evicting the oldest entry past the window.
    pub fn record_solve_time(&self, miner: &MinerId, seconds: u64) {
        let mut records = self.records.write();
        records.clock += 1;
        let now = records.clock;

        if !records.miners.contains_key(miner)
            && records.miners.len() >= self.cfg.max_tracked_miners.max(1)
        {
            if let Some(evicted) = records.evict_least_recent() {
                debug!(miner = %evicted, "dropped least recently active miner");
            }
        }

        let record = records.miners.entry(miner.clone()).or_default();
        record.last_active = now;
        record.solve_times.push_back(seconds);
        while record.solve_times.len() > self.cfg.window {
            record.solve_times.pop_front();
        }
        trace!(miner = %miner, seconds, len = record.solve_times.len(), "recorded solve time");
    }

    /// Classifies `miner` from its current window.
    pub fn reward_multiplier(&self, miner: &MinerId) -> Multiplier {
        let records = self.records.read();
        let Some(window) = records.miners.get(miner).map(|r| &r.solve_times) else {
            return Multiplier::Neutral;
        };
        if window.len() < self.cfg.window || window.is_empty() {
            return Multiplier::Neutral;
        }

        // Compare sums instead of dividing, so the mean is exact.
        let len = window.len() as u128;
        let sum: u128 = window.iter().map(|&s| u128::from(s)).sum();

        if sum < u128::from(self.cfg.fast_threshold_secs) * len {
            Multiplier::MinFactor
        } else if sum > u128::from(self.cfg.slow_threshold_secs) * len {
            Multiplier::MaxFactor
        } else {
            Multiplier::Neutral
        }
    }

    /// Basis-point factor for a [`Multiplier`] under this configuration.
    pub fn factor_bps(&self, m: Multiplier) -> u32 {
        match m {
            Multiplier::MinFactor => self.cfg.min_factor_bps,
            Multiplier::MaxFactor => self.cfg.max_factor_bps,
            Multiplier::Neutral => self.cfg.neutral_factor_bps,
        }
    }

    /// Snapshot of a miner's window, oldest first.
    pub fn solve_times(&self, miner: &MinerId) -> Vec<u64> {
        self.records
            .read()
            .miners
            .get(miner)
            .map(|r| r.solve_times.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn tracked_miners(&self) -> usize {
        self.records.read().miners.len()
    }
}
