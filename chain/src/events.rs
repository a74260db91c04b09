//! Structured event records.
//!
//! The core never talks to notification services. Instead every component
//! that makes a decision worth telling someone about (a flagged
//! transaction, an executed proposal, an appended block) emits a
//! [`LedgerEvent`] into an [`EventSink`]. The notification layer drains
//! the sink and delivers however it likes.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::governance::{ProposalId, ProposalStatus};
use crate::types::{Amount, ChainId, Hash256};

/// Decision records emitted by the ledger core.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    TransactionAccepted {
        tx_hash: Hash256,
        origin_chain: ChainId,
    },
    /// Anomaly scorer classified the transaction as an outlier.
    TransactionFlagged {
        tx_hash: Hash256,
        origin_chain: ChainId,
        amount: Amount,
    },
    /// Sidechain not on the whitelist.
    OriginRejected {
        tx_hash: Hash256,
        origin_chain: ChainId,
    },
    /// Rejected for any other reason (malformed, bad signature).
    TransactionRejected {
        tx_hash: Hash256,
        origin_chain: ChainId,
        reason: &'static str,
    },
    ProposalSubmitted {
        id: ProposalId,
        proposer: String,
        requested_funds: Amount,
    },
    /// Tally moved the proposal out of `Pending`.
    ProposalDecided {
        id: ProposalId,
        status: ProposalStatus,
    },
    ProposalExecuted {
        id: ProposalId,
        amount: Amount,
        treasury_balance: Amount,
    },
    /// Funds credited to the treasury outside of a proposal.
    TreasuryDeposited {
        amount: Amount,
        treasury_balance: Amount,
    },
    BlockAppended {
        height: u64,
        hash: Hash256,
        reward: Amount,
        issued_supply: Amount,
    },
}

impl LedgerEvent {
    /// Renders the event as a JSON object for the notification layer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Receiver for [`LedgerEvent`]s.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LedgerEvent);
}

/// In-memory FIFO of events waiting to be picked up.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<VecDeque<LedgerEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued event, oldest first.
    pub fn drain(&self) -> Vec<LedgerEvent> {
        self.events.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: LedgerEvent) {
        self.events.lock().push_back(event);
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: LedgerEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}
