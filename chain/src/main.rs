// src/main.rs
//
// Demo node that wires up the fairchain library:
//
// - TOML configuration (path from the first argument, defaults otherwise)
// - in-memory ledger with the default validator stack
// - event log + Prometheus metrics as event sinks
// - a short simulation: transactions, mined blocks, a treasury proposal.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fairchain::{
    Amount, ChainConfig, ChainId, EventLog, EventSink, FanoutSink, Ledger, MetricsRegistry,
    MiningSignals, Transaction,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "fairchain=info".to_string()),
        )
        .init();

    if let Err(err) = run_node() {
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

fn run_node() -> Result<(), String> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => ChainConfig::load(&path)
            .map_err(|e| format!("failed to load config from {path}: {e}"))?,
        None => ChainConfig::default(),
    };

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );
    let log = Arc::new(EventLog::new());
    let sinks: Vec<Arc<dyn EventSink>> = vec![log.clone() as Arc<dyn EventSink>, metrics.clone()];
    let sink: Arc<dyn EventSink> = Arc::new(FanoutSink::new(sinks));

    let ledger = Ledger::from_config(&cfg, sink)
        .map_err(|e| format!("failed to build ledger: {e}"))?
        .with_metrics(metrics.ledger.clone());

    // ---------------------------
    // Transactions
    // ---------------------------

    let now = current_unix_timestamp();
    let origins = ["mainnet", "sidechain_1", "unknown_chain"];
    for i in 0..60u64 {
        let origin = origins[(i % 3) as usize];
        let tx = Transaction::unsigned(
            Amount::from_coins(1 + i % 7),
            format!("demo transfer {i}").into_bytes(),
            now + i,
            ChainId::new(origin),
        );
        match ledger.submit_transaction(tx) {
            Ok(admission) => tracing::debug!(i, origin, outcome = admission.code(), "submitted"),
            Err(e) => tracing::debug!(i, origin, reason = e.code(), "refused"),
        }
    }

    // ---------------------------
    // Mining
    // ---------------------------

    let miners = [
        ("solo-cpu", MiningSignals { declared_hashrate: 5_000.0, is_gpu: false }),
        ("gpu-farm", MiningSignals { declared_hashrate: 5e9, is_gpu: true }),
    ];
    for round in 0..24u64 {
        let (miner, signals) = &miners[(round % 2) as usize];
        let solve_time = if round % 2 == 0 { 150 } else { 12 };
        let block = ledger.assemble_block(cfg.ledger.max_block_txs);
        let reward = ledger
            .accept_mined_block(block, miner, signals, solve_time)
            .map_err(|e| format!("block rejected: {e}"))?;
        tracing::info!(height = ledger.height(), miner, reward = %reward, "mined");
    }

    // ---------------------------
    // Governance
    // ---------------------------

    let gov = ledger.governance();
    let id = gov
        .submit(
            "block explorer",
            "fund a public block explorer",
            Amount::from_coins(25_000),
            "alice",
        )
        .map_err(|e| format!("proposal refused: {e}"))?;
    for voter in ["bob", "carol"] {
        gov.vote(id, voter, true)
            .map_err(|e| format!("vote refused: {e}"))?;
    }
    gov.execute(id)
        .map_err(|e| format!("execution failed: {e}"))?;

    // ---------------------------
    // Report
    // ---------------------------

    println!(
        "height={} issued_supply={} treasury={} mempool={}",
        ledger.height(),
        ledger.issued_supply(),
        ledger.treasury_balance(),
        ledger.mempool_len(),
    );
    for event in log.drain() {
        match event.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to render event: {e}"),
        }
    }
    print!("{}", metrics.gather_text());
    Ok(())
}

/// Returns the current wall-clock time as seconds since Unix epoch.
///
/// On error (system clock before epoch) this falls back to 0.
fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
