//! Top-level configuration for a ledger node.
//!
//! This module aggregates configuration for:
//!
//! - ledger limits (`LedgerConfig`),
//! - block rewards and miner reputation (`RewardConfig`, `ReputationConfig`),
//! - the anomaly scorer and sidechain whitelist (`AnomalyConfig`,
//!   `SidechainConfig`),
//! - treasury governance (`GovernanceConfig`).
//!
//! `ChainConfig` is read from TOML; every section and field is optional
//! and falls back to its default. Amounts are decimal strings in coins
//! (`"0.25"`) or whole-coin integers.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::governance::GovernanceConfig;
use crate::ledger::LedgerConfig;
use crate::reward::{ReputationConfig, RewardConfig};
use crate::sidechain::{AnomalyConfig, SidechainConfig};
use crate::types::{Amount, BPS_DENOMINATOR, COIN};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid governance key {0}")]
    InvalidKey(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for a ledger node.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub ledger: LedgerConfig,
    pub reward: RewardConfig,
    pub reputation: ReputationConfig,
    pub anomaly: AnomalyConfig,
    pub sidechain: SidechainConfig,
    pub governance: GovernanceConfig,
}

impl ChainConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: ChainConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses, and validates the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Rejects values that would make a subsystem misbehave or inflate
    /// issuance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.ledger.max_block_txs == 0 || self.ledger.max_block_size_bytes == 0 {
            return invalid("ledger block limits must be positive");
        }

        let r = &self.reward;
        if r.small_miner_boost_bps <= BPS_DENOMINATOR {
            return invalid("reward.small_miner_boost_bps must exceed 10000 (1.0)");
        }
        if r.gpu_penalty_bps >= BPS_DENOMINATOR {
            return invalid("reward.gpu_penalty_bps must be below 10000 (1.0)");
        }
        if !r.hashrate_limit.is_finite() || r.hashrate_limit < 0.0 {
            return invalid("reward.hashrate_limit must be a finite non-negative number");
        }
        if r.halving_interval == 0 {
            return invalid("reward.halving_interval must be positive");
        }

        let rep = &self.reputation;
        if rep.window == 0 {
            return invalid("reputation.window must be positive");
        }
        if rep.max_tracked_miners == 0 {
            return invalid("reputation.max_tracked_miners must be positive");
        }
        if rep.fast_threshold_secs > rep.slow_threshold_secs {
            return invalid("reputation.fast_threshold_secs exceeds slow_threshold_secs");
        }
        if rep.min_factor_bps > rep.max_factor_bps {
            return invalid("reputation.min_factor_bps exceeds max_factor_bps");
        }

        let a = &self.anomaly;
        if a.capacity == 0 || a.refit_every == 0 || a.n_trees == 0 {
            return invalid("anomaly capacity, refit_every and n_trees must be positive");
        }
        if a.min_samples < 2 || a.min_samples > a.capacity {
            return invalid("anomaly.min_samples must be in 2..=capacity");
        }
        if !(a.contamination > 0.0 && a.contamination <= 0.5) {
            return invalid("anomaly.contamination must be in (0, 0.5]");
        }

        let g = &self.governance;
        if g.required_signatures == 0 {
            return invalid("governance.required_signatures must be positive");
        }
        if !g.tally.is_satisfiable() {
            return invalid("governance.tally can never decide a proposal");
        }
        g.decoded_keys()?;

        Ok(())
    }
}

/// Deserializes an [`Amount`] from a decimal coin string or a whole-coin
/// integer.
pub(crate) fn de_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Coins(u64),
        Decimal(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Coins(coins) => coins
            .checked_mul(COIN)
            .map(Amount)
            .ok_or_else(|| serde::de::Error::custom(format!("amount {coins} overflows"))),
        Raw::Decimal(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
