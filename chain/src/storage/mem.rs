//! In-memory block store.
//!
//! Keeps blocks in a `HashMap` keyed by `BlockHash`, plus a height index
//! for the linear chain, and tracks the current tip separately.

use std::collections::{BTreeMap, HashMap};

use crate::ledger::store::BlockStore;
use crate::types::{Block, BlockHash};

/// In-memory implementation of [`BlockStore`].
#[derive(Default)]
pub struct InMemoryBlockStore {
    blocks: HashMap<BlockHash, Block>,
    by_height: BTreeMap<u64, BlockHash>,
    tip: Option<BlockHash>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get_block(&self, hash: &BlockHash) -> Option<Block> {
        self.blocks.get(hash).cloned()
    }

    fn block_at(&self, height: u64) -> Option<Block> {
        self.by_height
            .get(&height)
            .and_then(|hash| self.blocks.get(hash))
            .cloned()
    }

    fn put_block(&mut self, block: Block) {
        let hash = block.compute_hash();
        self.by_height.insert(block.height, hash);
        self.blocks.insert(hash, block);
    }

    fn tip(&self) -> Option<BlockHash> {
        self.tip
    }

    fn set_tip(&mut self, hash: BlockHash) {
        self.tip = Some(hash);
    }
}
