//! Whitelist + anomaly gate for sidechain-originated transactions.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::anomaly::AnomalyScorer;
use super::forest::IsolationForest;
use super::model::OutlierModel;
use crate::events::{EventSink, LedgerEvent};
use crate::types::{ChainId, Transaction};

/// Outcome of running a transaction through the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateVerdict {
    Admitted,
    /// Origin chain is not whitelisted; the scorer was not consulted.
    UnauthorizedOrigin,
    /// Whitelisted origin, but the scorer flagged the transaction.
    Anomalous,
}

impl GateVerdict {
    pub fn is_admitted(self) -> bool {
        self == GateVerdict::Admitted
    }

    /// Stable reason code for downstream systems.
    pub fn code(self) -> &'static str {
        match self {
            GateVerdict::Admitted => "admitted",
            GateVerdict::UnauthorizedOrigin => "unauthorized_origin",
            GateVerdict::Anomalous => "anomalous",
        }
    }
}

/// Admits sidechain transactions from authorized origins that the anomaly
/// scorer does not flag.
///
/// The whitelist changes only through [`authorize_chain`] and
/// [`revoke_chain`]; it is never inferred from transaction content.
///
/// [`authorize_chain`]: SidechainGate::authorize_chain
/// [`revoke_chain`]: SidechainGate::revoke_chain
pub struct SidechainGate<M = IsolationForest> {
    whitelist: RwLock<BTreeSet<ChainId>>,
    scorer: AnomalyScorer<M>,
    sink: Arc<dyn EventSink>,
}

impl<M: OutlierModel> SidechainGate<M> {
    pub fn new<I>(authorized: I, scorer: AnomalyScorer<M>, sink: Arc<dyn EventSink>) -> Self
    where
        I: IntoIterator<Item = ChainId>,
    {
        Self {
            whitelist: RwLock::new(authorized.into_iter().collect()),
            scorer,
            sink,
        }
    }

    pub fn scorer(&self) -> &AnomalyScorer<M> {
        &self.scorer
    }

    pub fn is_authorized(&self, chain: &ChainId) -> bool {
        self.whitelist.read().contains(chain)
    }

    /// Runs the whitelist check, then the scorer.
    pub fn evaluate(&self, tx: &Transaction) -> GateVerdict {
        if !self.is_authorized(&tx.origin_chain) {
            warn!(origin = %tx.origin_chain, "rejected transaction from unauthorized origin");
            self.sink.emit(LedgerEvent::OriginRejected {
                tx_hash: tx.compute_hash(),
                origin_chain: tx.origin_chain.clone(),
            });
            return GateVerdict::UnauthorizedOrigin;
        }

        if self.screen(tx) {
            GateVerdict::Anomalous
        } else {
            GateVerdict::Admitted
        }
    }

    pub fn admit(&self, tx: &Transaction) -> bool {
        self.evaluate(tx).is_admitted()
    }

    /// Scores `tx` without the whitelist check. Returns `true` if flagged.
    pub fn screen(&self, tx: &Transaction) -> bool {
        let flagged = self.scorer.score(tx);
        if flagged {
            warn!(
                origin = %tx.origin_chain,
                amount = %tx.amount,
                "transaction flagged as anomalous"
            );
            self.sink.emit(LedgerEvent::TransactionFlagged {
                tx_hash: tx.compute_hash(),
                origin_chain: tx.origin_chain.clone(),
                amount: tx.amount,
            });
        }
        flagged
    }

    /// Adds `chain` to the whitelist. Returns `false` if already present.
    pub fn authorize_chain(&self, chain: ChainId) -> bool {
        info!(chain = %chain, "authorizing sidechain");
        self.whitelist.write().insert(chain)
    }

    /// Removes `chain` from the whitelist. Returns `false` if absent.
    pub fn revoke_chain(&self, chain: &ChainId) -> bool {
        info!(chain = %chain, "revoking sidechain");
        self.whitelist.write().remove(chain)
    }

    pub fn authorized_chains(&self) -> Vec<ChainId> {
        self.whitelist.read().iter().cloned().collect()
    }
}
