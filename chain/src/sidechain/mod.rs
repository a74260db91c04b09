//! Sidechain transaction admission.
//!
//! - [`anomaly::AnomalyScorer`]: bounded feature window + refit cadence,
//! - [`forest::IsolationForest`]: the default seeded outlier model,
//! - [`gate::SidechainGate`]: origin whitelist in front of the scorer.

pub mod anomaly;
pub mod config;
pub mod forest;
pub mod gate;
pub mod model;

pub use anomaly::AnomalyScorer;
pub use config::{AnomalyConfig, SidechainConfig};
pub use forest::IsolationForest;
pub use gate::{GateVerdict, SidechainGate};
pub use model::{FeatureVector, OutlierModel};
