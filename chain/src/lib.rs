//! Fairchain library crate.
//!
//! A single-node proof-of-work ledger core with three extensions:
//!
//! - fair-mining block rewards (`reward`),
//! - sidechain admission through a whitelist and an anomaly scorer
//!   (`sidechain`),
//! - treasury governance and a protocol-update signature quorum
//!   (`governance`).
//!
//! Supporting modules provide strongly-typed domain types (`types`),
//! validity checks (`validation`), the ledger context object (`ledger`),
//! storage backends (`storage`), structured events (`events`),
//! Prometheus metrics (`metrics`), and TOML configuration (`config`).

pub mod config;
pub mod events;
pub mod governance;
pub mod ledger;
pub mod metrics;
pub mod reward;
pub mod sidechain;
pub mod storage;
pub mod types;
pub mod validation;

pub use config::{ChainConfig, ConfigError};

pub use events::{EventLog, EventSink, FanoutSink, LedgerEvent};

pub use governance::{
    GovernanceConfig, GovernanceError, GovernanceRegistry, Proposal, ProposalId, ProposalStatus,
    TallyPolicy,
};

pub use ledger::{
    AcceptAllValidator, Admission, BlockStore, BlockValidator, CombinedValidator, Components,
    DefaultValidator, Ledger, LedgerConfig, LedgerError, Mempool, TxPool, ValidationError,
};

pub use metrics::{LedgerMetrics, MetricsRegistry};

pub use reward::{
    MinerReputationTracker, MiningSignals, Multiplier, ReputationConfig, RewardConfig,
    RewardCurve, RewardEngine, RewardError, RewardQuote,
};

pub use sidechain::{
    AnomalyConfig, AnomalyScorer, GateVerdict, IsolationForest, OutlierModel, SidechainConfig,
    SidechainGate,
};

pub use storage::InMemoryBlockStore;

pub use validation::{BaseValidity, LinkageValidity, SignatureVerifier};

// Re-export domain types at the crate root for convenience.
pub use types::*;
