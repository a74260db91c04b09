//! Core domain types used by the ledger
//!
//! This module defines strongly-typed hashes, miner and chain identifiers,
//! fixed-point amounts, and key/signature wrappers that are shared across
//! the crate. The goal is to avoid "naked" byte buffers, strings, and
//! floating-point money in public APIs and instead use domain-specific
//! newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-point currency amounts.
pub mod amount;
/// Blocks, block hashes, and merkle roots.
pub mod block;
/// Transactions and their anomaly-model projection.
pub mod tx;

pub use amount::{Amount, AmountParseError, BPS_DENOMINATOR, COIN, DECIMALS};
pub use block::{Block, BlockHash, merkle_root};
pub use tx::{FeatureSample, Transaction};

/// Length in bytes of all 256-bit hash types used in this module.
pub const HASH_LEN: usize = 32;

/// Origin chain identifier used by native transactions.
pub const MAINNET: &str = "mainnet";

/// Maximum accepted length of a miner identity string.
pub const MAX_MINER_ID_LEN: usize = 64;

/// Strongly-typed 256-bit hash wrapper (BLAKE3-256).
///
/// This is the hash primitive used for block hashes and merkle roots. The
/// rest of the crate treats [`Hash256::compute`] as an opaque,
/// deterministic, collision-resistant function.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Hash256(pub [u8; HASH_LEN]);

impl Hash256 {
    /// The all-zero hash, used as the genesis parent and empty merkle root.
    pub const ZERO: Hash256 = Hash256([0u8; HASH_LEN]);

    /// Computes a new [`Hash256`] as the BLAKE3-256 hash of `data`.
    pub fn compute(data: &[u8]) -> Self {
        let h = blake3::hash(data);
        Hash256(*h.as_bytes())
    }

    /// Returns the underlying 32-byte hash as a borrowed array.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lower-case hex rendering, used in logs and event records.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Ed25519 public key bytes, wrapped to avoid naked `Vec<u8>`.
///
/// The bytes are not validated on construction; [`crate::SignatureVerifier`]
/// rejects malformed keys when they are used.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub Vec<u8>);

impl PublicKey {
    /// Returns the raw public key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s.trim()).map(PublicKey)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Detached Ed25519 signature bytes.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    /// Returns the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s.trim()).map(Signature)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Identity of a miner, as reported by the block-assembly layer.
///
/// Only constructed through [`MinerId::parse`], so every value held by the
/// reward subsystem is non-empty, at most [`MAX_MINER_ID_LEN`] bytes, and
/// made of ASCII alphanumerics plus `-`, `_`, `.` and `:`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MinerId(String);

impl MinerId {
    /// Validates and wraps a miner identity string.
    ///
    /// Returns `None` for malformed identities; callers translate this into
    /// their own error type.
    pub fn parse(raw: &str) -> Option<Self> {
        let ok = !raw.is_empty()
            && raw.len() <= MAX_MINER_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'));
        ok.then(|| MinerId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MinerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the chain a transaction originates from.
///
/// `"mainnet"` for native transactions; anything else is a sidechain and
/// must pass the sidechain gate.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn mainnet() -> Self {
        ChainId(MAINNET.to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        ChainId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_mainnet(&self) -> bool {
        self.0 == MAINNET
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_distinct() {
        let a = Hash256::compute(b"block");
        let b = Hash256::compute(b"block");
        let c = Hash256::compute(b"other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_hex().len(), HASH_LEN * 2);
    }

    #[test]
    fn miner_id_rejects_malformed_identities() {
        assert!(MinerId::parse("miner-01").is_some());
        assert!(MinerId::parse("pool.eu:7").is_some());
        assert!(MinerId::parse("").is_none());
        assert!(MinerId::parse("has space").is_none());
        assert!(MinerId::parse("naïve").is_none());
        assert!(MinerId::parse(&"x".repeat(MAX_MINER_ID_LEN + 1)).is_none());
    }

    #[test]
    fn chain_id_recognises_mainnet() {
        assert!(ChainId::mainnet().is_mainnet());
        assert!(!ChainId::new("sidechain_1").is_mainnet());
    }

    #[test]
    fn key_and_signature_hex_decoding() {
        let pk = PublicKey::from_hex("00ff").expect("valid hex");
        assert_eq!(pk.as_bytes(), &[0x00, 0xff]);
        assert!(Signature::from_hex("zz").is_err());
    }
}
