use serde::Deserialize;

/// Ledger limits.
///
/// Block limits apply to both assembled templates and appended blocks.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Hard limit on the number of transactions per block.
    pub max_block_txs: usize,
    /// Hard limit on the canonical encoded size of a block, in bytes.
    pub max_block_size_bytes: usize,
    /// Largest accepted transaction message, in bytes.
    pub max_message_len: usize,
    /// Transactions held in the mempool before submissions are refused.
    pub mempool_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_block_txs: 10_000,
            max_block_size_bytes: 1_000_000,
            max_message_len: 16 * 1024,
            mempool_capacity: 50_000,
        }
    }
}
