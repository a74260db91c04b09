//! Validity checks for the ledger.
//!
//! - [`signature::SignatureVerifier`]: Ed25519 checks for signed
//!   transactions and governance update signatures.
//! - [`base::BaseValidity`]: cheap block-local size checks.
//! - [`base::LinkageValidity`]: the block extends the tip it claims to.
//!
//! Block validators plug into the ledger via
//! [`crate::ledger::validator::BlockValidator`].

pub mod base;
pub mod signature;

pub use base::{BaseValidity, LinkageValidity};
pub use signature::SignatureVerifier;
