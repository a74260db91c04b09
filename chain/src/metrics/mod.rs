//! Metrics and instrumentation for the ledger.
//!
//! [`MetricsRegistry`] owns a Prometheus registry and the ledger metrics.
//! Counters and gauges are driven by [`crate::events::LedgerEvent`]s:
//! register the registry as an event sink (usually through a
//! [`crate::events::FanoutSink`]) and it keeps itself up to date.
//! Latency histograms are fed by the ledger directly, see
//! [`crate::ledger::Ledger::with_metrics`].
//!
//! ```ignore
//! let metrics = Arc::new(MetricsRegistry::new()?);
//! let sink = FanoutSink::new(vec![log.clone(), metrics.clone()]);
//! let ledger = Ledger::from_config(&cfg, Arc::new(sink))?
//!     .with_metrics(metrics.ledger.clone());
//! println!("{}", metrics.gather_text());
//! ```

pub mod prometheus;

pub use self::prometheus::{LedgerMetrics, MetricsRegistry};
