//! Treasury governance and protocol-update quorum.
//!
//! - [`proposal`]: proposal records and [`TallyPolicy`],
//! - [`treasury::Treasury`]: the single spendable balance,
//! - [`registry::GovernanceRegistry`]: proposal lifecycle plus governance
//!   keys.

pub mod config;
pub mod error;
pub mod proposal;
pub mod registry;
pub mod treasury;

pub use config::GovernanceConfig;
pub use error::GovernanceError;
pub use proposal::{Proposal, ProposalId, ProposalStatus, TallyPolicy};
pub use registry::GovernanceRegistry;
pub use treasury::Treasury;
