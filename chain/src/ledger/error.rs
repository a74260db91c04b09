use thiserror::Error;

use crate::reward::RewardError;
use crate::types::{BlockHash, ChainId};

/// Error returned when a block fails a validity predicate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("block has {count} txs, exceeds max_block_txs={max}")]
    TooManyTransactions { count: usize, max: usize },

    #[error("block size {size} bytes exceeds max_block_size_bytes={max}")]
    Oversized { size: usize, max: usize },

    #[error("block height {got} does not extend tip, expected {expected}")]
    HeightMismatch { expected: u64, got: u64 },

    #[error("block parent {got:?} is not the tip {expected:?}")]
    ParentMismatch { expected: BlockHash, got: BlockHash },

    #[error("merkle root does not match block transactions")]
    MerkleMismatch,

    #[error("invalid block: {0}")]
    Custom(String),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::TooManyTransactions { .. } => "too_many_transactions",
            ValidationError::Oversized { .. } => "block_oversized",
            ValidationError::HeightMismatch { .. } => "height_mismatch",
            ValidationError::ParentMismatch { .. } => "parent_mismatch",
            ValidationError::MerkleMismatch => "merkle_mismatch",
            ValidationError::Custom(_) => "invalid_block",
        }
    }
}

/// High-level errors surfaced by the [`Ledger`](super::Ledger).
///
/// Anomaly verdicts are not errors; see [`Admission`](super::Admission).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// Transaction failed structural checks at the boundary.
    #[error("malformed transaction: {0}")]
    Malformed(String),

    /// Signed transaction whose signature does not verify.
    #[error("signature verification failed")]
    VerificationFailure,

    #[error("origin chain {0} is not authorized")]
    UnauthorizedOrigin(ChainId),

    #[error("mempool is full ({0} transactions)")]
    MempoolFull(usize),

    #[error(transparent)]
    InvalidBlock(#[from] ValidationError),

    #[error(transparent)]
    Reward(#[from] RewardError),

    /// Storage-related failure, e.g. a missing tip block.
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Stable reason code for downstream systems.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Malformed(_) => "malformed",
            LedgerError::VerificationFailure => "verification_failure",
            LedgerError::UnauthorizedOrigin(_) => "unauthorized_origin",
            LedgerError::MempoolFull(_) => "mempool_full",
            LedgerError::InvalidBlock(e) => e.code(),
            LedgerError::Reward(e) => e.code(),
            LedgerError::Storage(_) => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_pass_through_wrapped_errors() {
        let e: LedgerError = ValidationError::MerkleMismatch.into();
        assert_eq!(e.code(), "merkle_mismatch");

        let e: LedgerError = RewardError::InvalidSignal("x".into()).into();
        assert_eq!(e.code(), "invalid_signal");
        assert_eq!(e.to_string(), "invalid mining signal: x");
    }
}
