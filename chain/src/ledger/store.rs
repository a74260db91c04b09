//! Storage abstraction used by the ledger.

use crate::types::{Block, BlockHash};

/// Block persistence for a single linear chain.
///
/// The ledger only needs get/put, lookup by height, and the current tip.
pub trait BlockStore: Send + Sync {
    /// Fetches a block by hash, if present.
    fn get_block(&self, hash: &BlockHash) -> Option<Block>;

    /// Fetches the block at `height`, if present.
    fn block_at(&self, height: u64) -> Option<Block>;

    /// Persists a block.
    fn put_block(&mut self, block: Block);

    /// Hash of the current tip, if any block was stored.
    fn tip(&self) -> Option<BlockHash>;

    /// Updates the current tip.
    fn set_tip(&mut self, hash: BlockHash);
}
