//! Storage backends for the ledger.
//!
//! Provides implementations of [`crate::ledger::store::BlockStore`]:
//!
//! - an in-memory store ([`mem::InMemoryBlockStore`]) for tests and
//!   single-process nodes.

pub mod mem;

pub use mem::InMemoryBlockStore;
