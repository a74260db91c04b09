//! Ed25519 signature verification.
//!
//! [`SignatureVerifier`] is the single place the crate checks a detached
//! signature against a message and a public key. It is stateless apart
//! from an input size cap, and it fails closed: malformed keys, malformed
//! signatures, and oversized messages all return `false` rather than an
//! error, since a bad signature is an expected outcome.

use ed25519_dalek::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, Signature, VerifyingKey};

/// Default cap on the size of a message accepted for verification.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 64 * 1024;

/// Stateless Ed25519 verifier.
#[derive(Clone, Copy, Debug)]
pub struct SignatureVerifier {
    max_message_len: usize,
}

impl Default for SignatureVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_LEN)
    }
}

impl SignatureVerifier {
    pub fn new(max_message_len: usize) -> Self {
        Self { max_message_len }
    }

    /// Returns `true` iff `signature` is a valid Ed25519 signature by
    /// `public_key` over `message`.
    ///
    /// Uses `verify_strict`, which rejects small-order keys and
    /// non-canonical signature encodings.
    pub fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        if message.len() > self.max_message_len {
            return false;
        }

        let Ok(pk_bytes) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(public_key) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
            return false;
        };

        let Ok(key) = VerifyingKey::from_bytes(&pk_bytes) else {
            return false;
        };
        let sig = Signature::from_bytes(&sig_bytes);

        key.verify_strict(message, &sig).is_ok()
    }

    /// Convenience wrapper taking hex-encoded signature and key.
    ///
    /// Undecodable hex is treated like any other malformed input.
    pub fn verify_hex(&self, message: &[u8], signature_hex: &str, public_key: &[u8]) -> bool {
        match hex::decode(signature_hex.trim()) {
            Ok(sig) => self.verify(message, &sig, public_key),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn accepts_valid_signature() {
        let sk = signing_key(7);
        let msg = b"transfer 5 to bob";
        let sig = sk.sign(msg);

        let v = SignatureVerifier::default();
        assert!(v.verify(msg, &sig.to_bytes(), sk.verifying_key().as_bytes()));
        assert!(v.verify_hex(
            msg,
            &hex::encode(sig.to_bytes()),
            sk.verifying_key().as_bytes()
        ));
    }

    #[test]
    fn rejects_wrong_key_or_tampered_message() {
        let sk = signing_key(7);
        let other = signing_key(8);
        let sig = sk.sign(b"original");

        let v = SignatureVerifier::default();
        assert!(!v.verify(b"original", &sig.to_bytes(), other.verifying_key().as_bytes()));
        assert!(!v.verify(b"tampered", &sig.to_bytes(), sk.verifying_key().as_bytes()));
    }

    #[test]
    fn malformed_inputs_fail_closed() {
        let sk = signing_key(1);
        let sig = sk.sign(b"m");
        let v = SignatureVerifier::default();

        assert!(!v.verify(b"m", &[], sk.verifying_key().as_bytes()));
        assert!(!v.verify(b"m", &sig.to_bytes()[..10], sk.verifying_key().as_bytes()));
        assert!(!v.verify(b"m", &sig.to_bytes(), &[0u8; 5]));
        assert!(!v.verify_hex(b"m", "not-hex", sk.verifying_key().as_bytes()));
    }

    #[test]
    fn oversized_message_is_rejected() {
        let sk = signing_key(3);
        let msg = vec![0u8; 33];
        let sig = sk.sign(&msg);

        let v = SignatureVerifier::new(32);
        assert!(!v.verify(&msg, &sig.to_bytes(), sk.verifying_key().as_bytes()));
    }
}
