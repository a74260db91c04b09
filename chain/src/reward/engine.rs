//! Final block reward computation.
//!
//! The engine composes the base [`RewardCurve`] with the small-miner
//! boost, the GPU penalty, and the miner's reputation factor, then clamps
//! the result under a documented ceiling so that governance-tuned factors
//! cannot inflate issuance without bound.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::config::{ReputationConfig, RewardConfig};
use super::curve::RewardCurve;
use super::reputation::{MinerReputationTracker, Multiplier};
use crate::types::{Amount, BPS_DENOMINATOR, MinerId};

/// Mining signals supplied by whatever detection mechanism the block
/// assembler uses. The engine does not inspect hardware itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MiningSignals {
    /// Hashrate the miner declared, in hashes per second.
    pub declared_hashrate: f64,
    /// Whether the miner is believed to be mining on a GPU.
    pub is_gpu: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewardError {
    #[error("invalid mining signal: {0}")]
    InvalidSignal(String),
}

impl RewardError {
    /// Stable reason code for downstream systems.
    pub fn code(&self) -> &'static str {
        match self {
            RewardError::InvalidSignal(_) => "invalid_signal",
        }
    }
}

/// Itemised result of a reward computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardQuote {
    pub base: Amount,
    pub boosted: bool,
    pub gpu_penalized: bool,
    pub multiplier: Multiplier,
    /// Whether the ceiling clamp changed the result.
    pub clamped: bool,
    pub reward: Amount,
}

/// Reward policy: curve + signals + reputation.
#[derive(Debug)]
pub struct RewardEngine {
    cfg: RewardConfig,
    curve: RewardCurve,
    tracker: MinerReputationTracker,
}

impl RewardEngine {
    pub fn new(cfg: RewardConfig, reputation: ReputationConfig) -> Self {
        let curve = RewardCurve::new(cfg.initial_reward, cfg.halving_interval);
        Self {
            cfg,
            curve,
            tracker: MinerReputationTracker::new(reputation),
        }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.cfg
    }

    pub fn curve(&self) -> &RewardCurve {
        &self.curve
    }

    /// The reputation tracker; callers record solve-times here once a
    /// block is actually accepted.
    pub fn tracker(&self) -> &MinerReputationTracker {
        &self.tracker
    }

    /// Final reward for `miner_id` mining at `height`.
    pub fn compute_reward(
        &self,
        miner_id: &str,
        height: u64,
        signals: &MiningSignals,
    ) -> Result<Amount, RewardError> {
        self.quote(miner_id, height, signals).map(|q| q.reward)
    }

    /// Like [`compute_reward`](Self::compute_reward) but returns every step.
    ///
    /// Fails with [`RewardError::InvalidSignal`] for a malformed miner id
    /// or a negative / non-finite hashrate. Reads the tracker, never
    /// writes it.
    pub fn quote(
        &self,
        miner_id: &str,
        height: u64,
        signals: &MiningSignals,
    ) -> Result<RewardQuote, RewardError> {
        let miner = MinerId::parse(miner_id)
            .ok_or_else(|| RewardError::InvalidSignal(format!("malformed miner id {miner_id:?}")))?;

        let hashrate = signals.declared_hashrate;
        if !hashrate.is_finite() || hashrate < 0.0 {
            return Err(RewardError::InvalidSignal(format!(
                "declared hashrate {hashrate} must be a finite non-negative number"
            )));
        }

        let base = self.curve.base_reward(height);
        let mut reward = base;

        let boosted = hashrate <= self.cfg.hashrate_limit;
        if boosted {
            reward = reward.mul_bps(self.cfg.small_miner_boost_bps);
        }

        if signals.is_gpu {
            reward = reward.mul_bps(self.cfg.gpu_penalty_bps);
        }

        let multiplier = self.tracker.reward_multiplier(&miner);
        reward = reward.mul_bps(self.tracker.factor_bps(multiplier));

        let ceiling = self.ceiling(base);
        let clamped = reward > ceiling;
        if clamped {
            reward = ceiling;
        }

        debug!(
            miner = %miner,
            height,
            base = %base,
            boosted,
            gpu = signals.is_gpu,
            ?multiplier,
            clamped,
            reward = %reward,
            "computed block reward"
        );

        Ok(RewardQuote {
            base,
            boosted,
            gpu_penalized: signals.is_gpu,
            multiplier,
            clamped,
            reward,
        })
    }

    /// Upper bound on any reward at a given base: the base scaled by the
    /// two boost factors, `base × max(boost, 1) × max(MAX_FACTOR, 1)`.
    ///
    /// Penalties and the neutral factor do not raise the ceiling, so a
    /// misconfigured penalty above 1.0 is clamped rather than paid out.
    pub fn ceiling(&self, base: Amount) -> Amount {
        let at_least_one = |bps: u32| bps.max(BPS_DENOMINATOR);
        base.mul_bps(at_least_one(self.cfg.small_miner_boost_bps))
            .mul_bps(at_least_one(self.tracker.config().max_factor_bps))
    }
}
