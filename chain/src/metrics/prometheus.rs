//! Prometheus-backed ledger metrics.

use prometheus::{
    self, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use tracing::warn;

use crate::events::{EventSink, LedgerEvent};
use crate::types::{Amount, COIN};

/// Ledger-related Prometheus metrics.
#[derive(Clone)]
pub struct LedgerMetrics {
    pub transactions_accepted: IntCounter,
    /// Transactions the anomaly scorer flagged for review.
    pub transactions_flagged: IntCounter,
    /// Rejected transactions, labelled by reason code.
    pub transactions_rejected: IntCounterVec,
    pub blocks_appended: IntCounter,
    pub proposals_executed: IntCounter,
    /// Time spent in the sidechain gate per screened transaction, in seconds.
    pub anomaly_scoring_seconds: Histogram,
    /// Latency of block validation, in seconds.
    pub block_validation_seconds: Histogram,
    /// Treasury balance in coins, seeded at startup and tracked through
    /// executions and deposits.
    pub treasury_balance: Gauge,
    /// Issued supply in coins, seeded at startup and tracked per block.
    pub issued_supply: Gauge,
}

impl LedgerMetrics {
    /// Registers ledger metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let transactions_accepted = IntCounter::with_opts(Opts::new(
            "ledger_transactions_accepted_total",
            "Transactions queued in the mempool",
        ))?;
        registry.register(Box::new(transactions_accepted.clone()))?;

        let transactions_flagged = IntCounter::with_opts(Opts::new(
            "ledger_transactions_flagged_total",
            "Transactions flagged as anomalous",
        ))?;
        registry.register(Box::new(transactions_flagged.clone()))?;

        let transactions_rejected = IntCounterVec::new(
            Opts::new(
                "ledger_transactions_rejected_total",
                "Transactions rejected, by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(transactions_rejected.clone()))?;

        let blocks_appended = IntCounter::with_opts(Opts::new(
            "ledger_blocks_appended_total",
            "Blocks appended to the chain",
        ))?;
        registry.register(Box::new(blocks_appended.clone()))?;

        let proposals_executed = IntCounter::with_opts(Opts::new(
            "governance_proposals_executed_total",
            "Treasury proposals executed",
        ))?;
        registry.register(Box::new(proposals_executed.clone()))?;

        let anomaly_scoring_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "sidechain_anomaly_scoring_seconds",
                "Time to screen a transaction through the sidechain gate in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )?;
        registry.register(Box::new(anomaly_scoring_seconds.clone()))?;

        let block_validation_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_block_validation_seconds",
                "Time to validate a block in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )?;
        registry.register(Box::new(block_validation_seconds.clone()))?;

        let treasury_balance = Gauge::with_opts(Opts::new(
            "governance_treasury_balance_coins",
            "Treasury balance in coins",
        ))?;
        registry.register(Box::new(treasury_balance.clone()))?;

        let issued_supply = Gauge::with_opts(Opts::new(
            "ledger_issued_supply_coins",
            "Issued supply in coins",
        ))?;
        registry.register(Box::new(issued_supply.clone()))?;

        Ok(Self {
            transactions_accepted,
            transactions_flagged,
            transactions_rejected,
            blocks_appended,
            proposals_executed,
            anomaly_scoring_seconds,
            block_validation_seconds,
            treasury_balance,
            issued_supply,
        })
    }

    /// Updates counters and gauges from a ledger event.
    pub fn record(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::TransactionAccepted { .. } => self.transactions_accepted.inc(),
            LedgerEvent::TransactionFlagged { .. } => self.transactions_flagged.inc(),
            LedgerEvent::OriginRejected { .. } => self
                .transactions_rejected
                .with_label_values(&["unauthorized_origin"])
                .inc(),
            LedgerEvent::TransactionRejected { reason, .. } => {
                self.transactions_rejected.with_label_values(&[*reason]).inc()
            }
            LedgerEvent::ProposalSubmitted { .. } | LedgerEvent::ProposalDecided { .. } => {}
            LedgerEvent::ProposalExecuted {
                treasury_balance, ..
            } => {
                self.proposals_executed.inc();
                self.set_treasury_balance(*treasury_balance);
            }
            LedgerEvent::TreasuryDeposited {
                treasury_balance, ..
            } => self.set_treasury_balance(*treasury_balance),
            LedgerEvent::BlockAppended { issued_supply, .. } => {
                self.blocks_appended.inc();
                self.set_issued_supply(*issued_supply);
            }
        }
    }

    pub fn set_treasury_balance(&self, balance: Amount) {
        self.treasury_balance.set(as_coins(balance));
    }

    pub fn set_issued_supply(&self, supply: Amount) {
        self.issued_supply.set(as_coins(supply));
    }
}

/// Gauges are floats; this is for display only.
fn as_coins(amount: Amount) -> f64 {
    amount.base_units() as f64 / COIN as f64
}

/// Wrapper around a Prometheus registry and the ledger metrics.
///
/// Wrap it in an `Arc` and share it; it is also an [`EventSink`].
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub ledger: LedgerMetrics,
}

impl MetricsRegistry {
    /// Creates a fresh `fairchain`-prefixed registry with the ledger
    /// metrics registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("fairchain".to_string()), None)?;
        let ledger = LedgerMetrics::register(&registry)?;
        Ok(Self { registry, ledger })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!(error = %e, "failed to encode Prometheus metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl EventSink for MetricsRegistry {
    fn emit(&self, event: LedgerEvent) {
        self.ledger.record(&event);
    }
}
