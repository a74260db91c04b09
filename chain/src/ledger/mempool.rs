//! FIFO pool of admitted transactions awaiting a block.

use std::collections::VecDeque;

use crate::types::Transaction;

/// Transaction pool interface used by block assembly.
pub trait TxPool {
    /// Removes and returns a batch of transactions for inclusion in a block.
    ///
    /// Never returns more than `max_txs` transactions, and stops before the
    /// summed canonical size would exceed `max_bytes`.
    fn select_for_block(&mut self, max_txs: usize, max_bytes: usize) -> Vec<Transaction>;
}

/// Bounded FIFO mempool.
#[derive(Debug)]
pub struct Mempool {
    txs: VecDeque<Transaction>,
    capacity: usize,
}

impl Mempool {
    pub fn new(capacity: usize) -> Self {
        Self {
            txs: VecDeque::new(),
            capacity,
        }
    }

    /// Queues `tx`. Returns it back if the pool is full.
    pub fn push(&mut self, tx: Transaction) -> Result<(), Transaction> {
        if self.txs.len() >= self.capacity {
            return Err(tx);
        }
        self.txs.push_back(tx);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl TxPool for Mempool {
    fn select_for_block(&mut self, max_txs: usize, max_bytes: usize) -> Vec<Transaction> {
        let mut out = Vec::new();
        let mut used = 0usize;
        while out.len() < max_txs {
            let Some(next) = self.txs.front() else { break };
            let size = next.canonical_bytes().len();
            if used + size > max_bytes {
                break;
            }
            used += size;
            if let Some(tx) = self.txs.pop_front() {
                out.push(tx);
            }
        }
        out
    }
}
