use thiserror::Error;

use super::proposal::{ProposalId, ProposalStatus};
use crate::types::Amount;

/// Errors from governance operations.
///
/// Every variant is returned before any state is mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("unknown proposal {0}")]
    UnknownProposal(ProposalId),

    #[error("voter {voter:?} already voted on proposal {proposal}")]
    DuplicateVote { proposal: ProposalId, voter: String },

    #[error("cannot {operation} proposal {proposal} in state {status:?}")]
    InvalidState {
        proposal: ProposalId,
        status: ProposalStatus,
        operation: &'static str,
    },

    #[error("treasury holds {available}, proposal requests {requested}")]
    InsufficientTreasury { requested: Amount, available: Amount },

    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("invalid governance key: {0}")]
    InvalidKey(String),

    #[error("treasury balance would overflow")]
    TreasuryOverflow,
}

impl GovernanceError {
    /// Stable reason code for downstream systems.
    pub fn code(&self) -> &'static str {
        match self {
            GovernanceError::UnknownProposal(_) => "unknown_proposal",
            GovernanceError::DuplicateVote { .. } => "duplicate_vote",
            GovernanceError::InvalidState { .. } => "invalid_state",
            GovernanceError::InsufficientTreasury { .. } => "insufficient_treasury",
            GovernanceError::InvalidProposal(_) => "invalid_proposal",
            GovernanceError::InvalidKey(_) => "invalid_key",
            GovernanceError::TreasuryOverflow => "treasury_overflow",
        }
    }
}
