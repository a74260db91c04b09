use serde::Deserialize;

use crate::config::de_amount;
use crate::types::{Amount, BPS_DENOMINATOR};

/// Block reward parameters.
///
/// Factors are basis points: `10_000` is `1.0`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Base reward of the first era.
    #[serde(deserialize_with = "de_amount")]
    pub initial_reward: Amount,
    /// Blocks per reduction era.
    pub halving_interval: u64,
    /// Hard cap on the total issued supply.
    #[serde(deserialize_with = "de_amount")]
    pub max_supply: Amount,
    /// Declared hashrate (H/s) above which a miner gets no small-miner boost.
    pub hashrate_limit: f64,
    /// Boost for miners at or below `hashrate_limit`; must exceed 1.0.
    pub small_miner_boost_bps: u32,
    /// Penalty applied to GPU miners; must be below 1.0.
    pub gpu_penalty_bps: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            initial_reward: Amount::from_coins(50),
            halving_interval: 210_000,
            max_supply: Amount::from_coins(112_000_000),
            hashrate_limit: 100_000_000.0,
            small_miner_boost_bps: 11_000,
            gpu_penalty_bps: 8_000,
        }
    }
}

/// Solve-time reputation parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Number of most recent solve-times kept per miner.
    pub window: usize,
    /// Mean solve-time (seconds) below which a miner is penalised.
    pub fast_threshold_secs: u64,
    /// Mean solve-time (seconds) above which a miner gets the max factor.
    pub slow_threshold_secs: u64,
    pub min_factor_bps: u32,
    pub max_factor_bps: u32,
    pub neutral_factor_bps: u32,
    /// Most miners tracked at once; the least recently active is dropped
    /// to make room for a new one.
    pub max_tracked_miners: usize,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            window: 10,
            fast_threshold_secs: 30,
            slow_threshold_secs: 120,
            min_factor_bps: 5_000,
            max_factor_bps: BPS_DENOMINATOR,
            neutral_factor_bps: BPS_DENOMINATOR,
            max_tracked_miners: 10_000,
        }
    }
}
