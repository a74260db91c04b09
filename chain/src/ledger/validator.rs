//! Block validity predicates used by the ledger.

use crate::types::Block;

use super::error::ValidationError;

/// Pluggable validity predicate for blocks.
///
/// `parent` is the current tip the block claims to extend. Implementations
/// should be deterministic and side-effect free.
pub trait BlockValidator: Send + Sync {
    fn validate(&self, block: &Block, parent: &Block) -> Result<(), ValidationError>;
}

/// A validator that accepts every block.
pub struct AcceptAllValidator;

impl BlockValidator for AcceptAllValidator {
    fn validate(&self, _block: &Block, _parent: &Block) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Runs `first`, then `second`, failing on the first error.
pub struct CombinedValidator<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> CombinedValidator<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> BlockValidator for CombinedValidator<A, B>
where
    A: BlockValidator,
    B: BlockValidator,
{
    fn validate(&self, block: &Block, parent: &Block) -> Result<(), ValidationError> {
        self.first.validate(block, parent)?;
        self.second.validate(block, parent)?;
        Ok(())
    }
}
