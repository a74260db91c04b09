// chain/src/types/tx.rs

//! Transaction type for the ledger.
//!
//! A [`Transaction`] is a tagged, validated record rather than a loose
//! key/value map: every field has a concrete type, and malformed records
//! are rejected by the ledger at the boundary before they reach the
//! signature verifier or the anomaly scorer.

use serde::{Deserialize, Serialize};

use super::{Amount, ChainId, Hash256, PublicKey, Signature};

/// Modulus applied to the transaction timestamp when projecting it into
/// the anomaly model's feature space.
pub const TIMESTAMP_FEATURE_MODULUS: u64 = 1_000_000;

/// A value-carrying transaction, native or sidechain-originated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Amount moved by the transaction, in base units.
    pub amount: Amount,

    /// Opaque payload. For signed transactions this is the exact byte
    /// string the signature covers.
    pub message: Vec<u8>,

    /// Seconds since Unix epoch, as claimed by the sender.
    pub timestamp: u64,

    /// Detached Ed25519 signature over `message`, or empty if unsigned.
    pub signature: Signature,

    /// Signer's Ed25519 public key, or empty if unsigned.
    pub public_key: PublicKey,

    /// Chain the transaction originates from (`"mainnet"` for native).
    pub origin_chain: ChainId,
}

impl Transaction {
    /// Builds an unsigned transaction.
    pub fn unsigned(
        amount: Amount,
        message: impl Into<Vec<u8>>,
        timestamp: u64,
        origin_chain: ChainId,
    ) -> Self {
        Self {
            amount,
            message: message.into(),
            timestamp,
            signature: Signature::default(),
            public_key: PublicKey::default(),
            origin_chain,
        }
    }

    /// Attaches a signature and the signer's public key.
    pub fn with_signature(mut self, signature: Signature, public_key: PublicKey) -> Self {
        self.signature = signature;
        self.public_key = public_key;
        self
    }

    /// A transaction counts as signed if it carries a signature or a key.
    ///
    /// Carrying only one of the two is malformed; the ledger rejects that
    /// before signature verification.
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty() || !self.public_key.is_empty()
    }

    /// Canonical bincode-2 encoding, used for merkle leaves.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails, which would be a programming error: all
    /// fields are plain serializable data.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let cfg = bincode::config::standard();
        bincode::serde::encode_to_vec(self, cfg)
            .expect("Transaction should always be serializable with bincode 2 + serde")
    }

    /// Content hash of the canonical encoding.
    pub fn compute_hash(&self) -> Hash256 {
        Hash256::compute(&self.canonical_bytes())
    }

    /// Projects this transaction into the anomaly model's feature space.
    pub fn features(&self) -> FeatureSample {
        FeatureSample {
            amount: self.amount.base_units() as f64,
            message_len: self.message.len() as f64,
            time_of_cycle: (self.timestamp % TIMESTAMP_FEATURE_MODULUS) as f64,
        }
    }
}

/// Fixed-width numeric projection of a transaction.
///
/// `(amount, message_length, timestamp mod 1_000_000)`. Floating point is
/// fine here: samples only feed the outlier model, never the accounts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSample {
    pub amount: f64,
    pub message_len: f64,
    pub time_of_cycle: f64,
}

impl FeatureSample {
    /// Number of features in a sample.
    pub const WIDTH: usize = 3;

    pub fn to_array(self) -> [f64; Self::WIDTH] {
        [self.amount, self.message_len, self.time_of_cycle]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_tx() -> Transaction {
        Transaction::unsigned(
            Amount::from_coins(3),
            b"pay alice".to_vec(),
            1_700_123_456,
            ChainId::new("sidechain_1"),
        )
    }

    #[test]
    fn features_project_amount_length_and_time_bucket() {
        let f = dummy_tx().features();
        assert_eq!(f.amount, 3_000_000.0);
        assert_eq!(f.message_len, 9.0);
        assert_eq!(f.time_of_cycle, 123_456.0);
        assert_eq!(f.to_array(), [3_000_000.0, 9.0, 123_456.0]);
    }

    #[test]
    fn signed_flag_tracks_signature_material() {
        let tx = dummy_tx();
        assert!(!tx.is_signed());

        let signed = tx.with_signature(Signature(vec![1; 64]), PublicKey(vec![2; 32]));
        assert!(signed.is_signed());
    }

    #[test]
    fn hash_depends_on_origin_chain() {
        let a = dummy_tx();
        let mut b = dummy_tx();
        b.origin_chain = ChainId::mainnet();

        assert_eq!(a.compute_hash(), dummy_tx().compute_hash());
        assert_ne!(a.compute_hash(), b.compute_hash());
    }
}
