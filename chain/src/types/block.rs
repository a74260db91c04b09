// chain/src/types/block.rs

//! Block types and hashing.
//!
//! This module defines the block data structure, a canonical hashing
//! routine, and the merkle commitment over a block's transactions.
//!
//! Serialization is done with **bincode 2** using the `serde` integration
//! (`bincode::serde::encode_to_vec`) and an explicit `standard()` config.
//! The same canonical encoding is used everywhere we need block bytes.

use serde::{Deserialize, Serialize};

use super::{Hash256, Transaction};

/// Strongly-typed block hash.
///
/// This is the BLAKE3-256 digest of the canonical encoding of a block's
/// linking fields (`height`, `previous_hash`, `merkle_root`). Transaction
/// contents are committed through the merkle root.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub Hash256);

impl BlockHash {
    /// Parent hash of the genesis block.
    pub const ZERO: BlockHash = BlockHash(Hash256::ZERO);
}

/// A block in the chain.
///
/// Height 0 is the unique genesis block, with a zero parent hash and no
/// transactions. Blocks are immutable once appended to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Height of this block; genesis is 0.
    pub height: u64,
    /// Hash of the parent block ([`BlockHash::ZERO`] for genesis).
    pub previous_hash: BlockHash,
    /// Ordered list of transactions included in this block.
    pub transactions: Vec<Transaction>,
    /// Merkle root over `transactions`, see [`merkle_root`].
    pub merkle_root: Hash256,
}

/// The subset of block fields that the block hash commits to.
#[derive(Serialize)]
struct LinkingFields<'a> {
    height: u64,
    previous_hash: &'a BlockHash,
    merkle_root: &'a Hash256,
}

impl Block {
    /// The genesis block.
    pub fn genesis() -> Self {
        Self {
            height: 0,
            previous_hash: BlockHash::ZERO,
            transactions: Vec::new(),
            merkle_root: Hash256::ZERO,
        }
    }

    /// Builds a block and fills in the merkle root from `transactions`.
    pub fn new(height: u64, previous_hash: BlockHash, transactions: Vec<Transaction>) -> Self {
        let merkle_root = merkle_root(&transactions);
        Self {
            height,
            previous_hash,
            transactions,
            merkle_root,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Returns the canonical byte representation of this block.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails. This is considered a programming
    /// error, because all fields are required to be serializable.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Explicit config to avoid relying on any implicit defaults.
        let cfg = bincode::config::standard();
        bincode::serde::encode_to_vec(self, cfg)
            .expect("Block should always be serializable with bincode 2 + serde")
    }

    /// Computes the block hash over the linking fields.
    ///
    /// This must remain stable across nodes; anything that changes the
    /// linking-field encoding is a consensus change.
    pub fn compute_hash(&self) -> BlockHash {
        let cfg = bincode::config::standard();
        let fields = LinkingFields {
            height: self.height,
            previous_hash: &self.previous_hash,
            merkle_root: &self.merkle_root,
        };
        let bytes = bincode::serde::encode_to_vec(&fields, cfg)
            .expect("block linking fields should always be serializable");
        BlockHash(Hash256::compute(&bytes))
    }

    /// Returns `true` if the stored merkle root matches the transactions.
    pub fn merkle_root_matches(&self) -> bool {
        merkle_root(&self.transactions) == self.merkle_root
    }
}

/// Computes the merkle root of a transaction list.
///
/// Leaves are the transaction hashes; each level hashes the concatenation
/// of adjacent pairs, duplicating the last node of an odd level. An empty
/// list commits to [`Hash256::ZERO`].
pub fn merkle_root(transactions: &[Transaction]) -> Hash256 {
    if transactions.is_empty() {
        return Hash256::ZERO;
    }

    let mut level: Vec<Hash256> = transactions.iter().map(|tx| tx.compute_hash()).collect();

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut buf = [0u8; 2 * super::HASH_LEN];
                buf[..super::HASH_LEN].copy_from_slice(left.as_bytes());
                buf[super::HASH_LEN..].copy_from_slice(right.as_bytes());
                Hash256::compute(&buf)
            })
            .collect();
    }

    level[0]
}
