//! Fair-mining block rewards.
//!
//! - [`curve::RewardCurve`]: base reward by height (2/3 per era),
//! - [`reputation::MinerReputationTracker`]: rolling solve-time windows,
//! - [`engine::RewardEngine`]: final reward from curve, signals, and
//!   reputation, with a ceiling clamp.

pub mod config;
pub mod curve;
pub mod engine;
pub mod reputation;

pub use config::{ReputationConfig, RewardConfig};
pub use curve::RewardCurve;
pub use engine::{MiningSignals, RewardEngine, RewardError, RewardQuote};
pub use reputation::{MinerReputationTracker, Multiplier};
