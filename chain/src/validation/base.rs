//! Base block validity predicates.
//!
//! Both validators enforce cheap, deterministic invariants that need
//! nothing but the block and its parent:
//!
//! - block size and transaction count limits ([`BaseValidity`]),
//! - height, parent hash, and merkle commitment ([`LinkageValidity`]).

use crate::ledger::config::LedgerConfig;
use crate::ledger::error::ValidationError;
use crate::ledger::validator::BlockValidator;
use crate::types::Block;

/// Size limits for blocks.
#[derive(Clone, Debug)]
pub struct BaseValidity {
    max_block_txs: usize,
    max_block_size_bytes: usize,
}

impl BaseValidity {
    pub fn new(cfg: &LedgerConfig) -> Self {
        Self {
            max_block_txs: cfg.max_block_txs,
            max_block_size_bytes: cfg.max_block_size_bytes,
        }
    }

    fn check_tx_count(&self, block: &Block) -> Result<(), ValidationError> {
        let count = block.transactions.len();
        if count > self.max_block_txs {
            return Err(ValidationError::TooManyTransactions {
                count,
                max: self.max_block_txs,
            });
        }
        Ok(())
    }

    fn check_block_size(&self, block: &Block) -> Result<(), ValidationError> {
        let size = block.canonical_bytes().len();
        if size > self.max_block_size_bytes {
            return Err(ValidationError::Oversized {
                size,
                max: self.max_block_size_bytes,
            });
        }
        Ok(())
    }
}

impl BlockValidator for BaseValidity {
    fn validate(&self, block: &Block, _parent: &Block) -> Result<(), ValidationError> {
        self.check_tx_count(block)?;
        self.check_block_size(block)?;
        Ok(())
    }
}

/// Requires `block` to sit directly on top of `parent`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkageValidity;

impl BlockValidator for LinkageValidity {
    fn validate(&self, block: &Block, parent: &Block) -> Result<(), ValidationError> {
        let expected = parent.height + 1;
        if block.height != expected {
            return Err(ValidationError::HeightMismatch {
                expected,
                got: block.height,
            });
        }

        let parent_hash = parent.compute_hash();
        if block.previous_hash != parent_hash {
            return Err(ValidationError::ParentMismatch {
                expected: parent_hash,
                got: block.previous_hash,
            });
        }

        if !block.merkle_root_matches() {
            return Err(ValidationError::MerkleMismatch);
        }
        Ok(())
    }
}
