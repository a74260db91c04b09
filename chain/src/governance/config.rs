use ed25519_dalek::{PUBLIC_KEY_LENGTH, VerifyingKey};
use serde::Deserialize;

use super::proposal::TallyPolicy;
use crate::config::{ConfigError, de_amount};
use crate::types::{Amount, PublicKey};

/// Governance parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Opening treasury balance.
    #[serde(deserialize_with = "de_amount")]
    pub treasury_balance: Amount,
    /// Hex-encoded Ed25519 public keys allowed to sign protocol updates.
    pub keys: Vec<String>,
    /// Distinct governance signatures needed to accept a protocol update.
    pub required_signatures: usize,
    /// How votes on treasury proposals are tallied.
    pub tally: TallyPolicy,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            treasury_balance: Amount::from_coins(10_000_000),
            keys: Vec::new(),
            required_signatures: 2,
            tally: TallyPolicy::default(),
        }
    }
}

impl GovernanceConfig {
    /// Decodes `keys`, rejecting anything that is not a valid Ed25519
    /// public key and any key listed twice.
    pub fn decoded_keys(&self) -> Result<Vec<PublicKey>, ConfigError> {
        let mut decoded: Vec<PublicKey> = Vec::with_capacity(self.keys.len());
        for k in &self.keys {
            let pk = PublicKey::from_hex(k)
                .map_err(|e| ConfigError::InvalidKey(format!("{k}: {e}")))?;
            let bytes = <[u8; PUBLIC_KEY_LENGTH]>::try_from(pk.as_bytes()).map_err(|_| {
                ConfigError::InvalidKey(format!(
                    "{k}: expected {PUBLIC_KEY_LENGTH} bytes, got {}",
                    pk.as_bytes().len()
                ))
            })?;
            if VerifyingKey::from_bytes(&bytes).is_err() {
                return Err(ConfigError::InvalidKey(format!(
                    "{k}: not a valid Ed25519 point"
                )));
            }
            if decoded.contains(&pk) {
                return Err(ConfigError::InvalidKey(format!("{k}: listed more than once")));
            }
            decoded.push(pk);
        }
        Ok(decoded)
    }
}
