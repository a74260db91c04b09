//! The ledger context object.
//!
//! [`Ledger`] owns the block sequence and the mempool, and it wires
//! together the other subsystems:
//!
//! - a [`BlockStore`] for persistence,
//! - a [`BlockValidator`] for size and linkage checks,
//! - the [`SignatureVerifier`] and [`SidechainGate`] for admission,
//! - the [`RewardEngine`] and issued-supply accounting for mined blocks,
//! - the [`GovernanceRegistry`] for treasury and proposals.
//!
//! Every operation takes `&self`; share the ledger behind an `Arc`.

pub mod config;
pub mod error;
pub mod mempool;
pub mod store;
pub mod validator;

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub use config::LedgerConfig;
pub use error::{LedgerError, ValidationError};
pub use mempool::{Mempool, TxPool};
pub use store::BlockStore;
pub use validator::{AcceptAllValidator, BlockValidator, CombinedValidator};

use crate::config::{ChainConfig, ConfigError};
use crate::events::{EventSink, LedgerEvent};
use crate::governance::GovernanceRegistry;
use crate::metrics::LedgerMetrics;
use crate::reward::{MiningSignals, RewardEngine};
use crate::sidechain::{AnomalyScorer, GateVerdict, SidechainGate};
use crate::storage::InMemoryBlockStore;
use crate::types::{Amount, Block, BlockHash, ChainId, Hash256, MinerId, Transaction};
use crate::validation::{BaseValidity, LinkageValidity, SignatureVerifier};

/// Size checks followed by linkage checks.
pub type DefaultValidator = CombinedValidator<BaseValidity, LinkageValidity>;

/// Room left in a block template for the transaction-count prefix to grow.
const LENGTH_PREFIX_SLACK: usize = 16;

/// Outcome of a successful transaction submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Queued in the mempool.
    Accepted(Hash256),
    /// Held back for review by the anomaly scorer; not queued.
    Flagged(Hash256),
}

impl Admission {
    pub fn is_accepted(self) -> bool {
        matches!(self, Admission::Accepted(_))
    }

    pub fn tx_hash(self) -> Hash256 {
        match self {
            Admission::Accepted(h) | Admission::Flagged(h) => h,
        }
    }

    /// Stable reason code for downstream systems.
    pub fn code(self) -> &'static str {
        match self {
            Admission::Accepted(_) => "accepted",
            Admission::Flagged(_) => "flagged",
        }
    }
}

/// Subsystems the ledger consults, built by the caller.
pub struct Components {
    pub rewards: RewardEngine,
    pub gate: SidechainGate,
    pub governance: GovernanceRegistry,
    /// Run mainnet transactions through the anomaly scorer too.
    pub screen_mainnet: bool,
}

struct ChainState<S> {
    store: S,
    tip: Block,
    issued_supply: Amount,
}

/// Single-node ledger.
pub struct Ledger<S = InMemoryBlockStore, V = DefaultValidator> {
    config: LedgerConfig,
    chain: RwLock<ChainState<S>>,
    validator: V,
    mempool: Mutex<Mempool>,
    verifier: SignatureVerifier,
    rewards: RewardEngine,
    gate: SidechainGate,
    governance: GovernanceRegistry,
    screen_mainnet: bool,
    sink: Arc<dyn EventSink>,
    metrics: Option<LedgerMetrics>,
}

impl Ledger {
    /// Builds an in-memory ledger with the default validator stack.
    ///
    /// `sink` receives every event emitted by the ledger, the gate, and
    /// the governance registry.
    pub fn from_config(cfg: &ChainConfig, sink: Arc<dyn EventSink>) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let scorer = AnomalyScorer::from_config(cfg.anomaly.clone());
        let authorized = cfg.sidechain.authorized_chains.iter().map(ChainId::new);
        let components = Components {
            rewards: RewardEngine::new(cfg.reward.clone(), cfg.reputation.clone()),
            gate: SidechainGate::new(authorized, scorer, sink.clone()),
            governance: GovernanceRegistry::from_config(&cfg.governance, sink.clone())?,
            screen_mainnet: cfg.sidechain.screen_mainnet,
        };
        let validator = CombinedValidator::new(BaseValidity::new(&cfg.ledger), LinkageValidity);

        Ledger::new(
            cfg.ledger.clone(),
            InMemoryBlockStore::new(),
            validator,
            components,
            sink,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl<S, V> Ledger<S, V>
where
    S: BlockStore,
    V: BlockValidator,
{
    /// Creates a ledger on top of `store`.
    ///
    /// An empty store is initialised with the genesis block. Issued supply
    /// counts rewards credited by this instance.
    pub fn new(
        config: LedgerConfig,
        mut store: S,
        validator: V,
        components: Components,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, LedgerError> {
        let tip = match store.tip() {
            Some(hash) => store
                .get_block(&hash)
                .ok_or_else(|| LedgerError::Storage(format!("tip block {hash:?} is missing")))?,
            None => {
                let genesis = Block::genesis();
                let hash = genesis.compute_hash();
                store.put_block(genesis.clone());
                store.set_tip(hash);
                info!(hash = %hash.0.to_hex(), "initialised chain with genesis block");
                genesis
            }
        };

        Ok(Self {
            mempool: Mutex::new(Mempool::new(config.mempool_capacity)),
            verifier: SignatureVerifier::new(config.max_message_len),
            config,
            chain: RwLock::new(ChainState {
                store,
                tip,
                issued_supply: Amount::ZERO,
            }),
            validator,
            rewards: components.rewards,
            gate: components.gate,
            governance: components.governance,
            screen_mainnet: components.screen_mainnet,
            sink,
            metrics: None,
        })
    }

    /// Records validation and screening latencies into `metrics`.
    /// Gauges start from the current treasury balance and issued supply.
    pub fn with_metrics(mut self, metrics: LedgerMetrics) -> Self {
        metrics.set_treasury_balance(self.governance.treasury_balance());
        metrics.set_issued_supply(self.chain.get_mut().issued_supply);
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn gate(&self) -> &SidechainGate {
        &self.gate
    }

    pub fn governance(&self) -> &GovernanceRegistry {
        &self.governance
    }

    pub fn rewards(&self) -> &RewardEngine {
        &self.rewards
    }

    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Validates `tx` and queues it in the mempool.
    ///
    /// Pipeline: structural checks, signature check for signed
    /// transactions, then the sidechain gate for non-mainnet origins.
    /// A flagged transaction is reported as [`Admission::Flagged`] and is
    /// not queued.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<Admission, LedgerError> {
        let tx_hash = tx.compute_hash();
        let origin_chain = tx.origin_chain.clone();

        let result = self.screen_transaction(&tx).and_then(|flagged| {
            if flagged {
                return Ok(Admission::Flagged(tx_hash));
            }
            let mut pool = self.mempool.lock();
            pool.push(tx)
                .map_err(|_| LedgerError::MempoolFull(pool.capacity()))?;
            Ok(Admission::Accepted(tx_hash))
        });

        match &result {
            Ok(Admission::Accepted(_)) => {
                debug!(tx = %tx_hash.to_hex(), origin = %origin_chain, "transaction accepted");
                self.sink.emit(LedgerEvent::TransactionAccepted {
                    tx_hash,
                    origin_chain,
                });
            }
            Ok(Admission::Flagged(_)) => {}
            // The gate already reported the unauthorized origin.
            Err(LedgerError::UnauthorizedOrigin(_)) => {}
            Err(err) => {
                warn!(tx = %tx_hash.to_hex(), origin = %origin_chain, error = %err, "transaction rejected");
                self.sink.emit(LedgerEvent::TransactionRejected {
                    tx_hash,
                    origin_chain,
                    reason: err.code(),
                });
            }
        }
        result
    }

    /// Returns `Ok(true)` if the transaction is flagged as anomalous.
    fn screen_transaction(&self, tx: &Transaction) -> Result<bool, LedgerError> {
        self.check_structure(tx)?;

        if tx.is_signed()
            && !self.verifier.verify(
                &tx.message,
                tx.signature.as_bytes(),
                tx.public_key.as_bytes(),
            )
        {
            return Err(LedgerError::VerificationFailure);
        }

        let started = Instant::now();
        let flagged = if !tx.origin_chain.is_mainnet() {
            match self.gate.evaluate(tx) {
                GateVerdict::UnauthorizedOrigin => {
                    return Err(LedgerError::UnauthorizedOrigin(tx.origin_chain.clone()));
                }
                GateVerdict::Anomalous => true,
                GateVerdict::Admitted => false,
            }
        } else if self.screen_mainnet {
            self.gate.screen(tx)
        } else {
            return Ok(false);
        };

        if let Some(m) = &self.metrics {
            m.anomaly_scoring_seconds
                .observe(started.elapsed().as_secs_f64());
        }
        Ok(flagged)
    }

    fn check_structure(&self, tx: &Transaction) -> Result<(), LedgerError> {
        if tx.origin_chain.as_str().trim().is_empty() {
            return Err(LedgerError::Malformed("empty origin chain".into()));
        }
        if tx.message.len() > self.config.max_message_len {
            return Err(LedgerError::Malformed(format!(
                "message is {} bytes, limit is {}",
                tx.message.len(),
                self.config.max_message_len
            )));
        }
        if tx.signature.is_empty() != tx.public_key.is_empty() {
            return Err(LedgerError::Malformed(
                "signature and public key must be supplied together".into(),
            ));
        }
        Ok(())
    }

    /// Drains up to `max_txs` mempool transactions, oldest first, into a
    /// block template on top of the current tip.
    ///
    /// The template respects the configured block limits. It is not
    /// appended; pass it to [`append_block`](Self::append_block) or
    /// [`accept_mined_block`](Self::accept_mined_block) once mined.
    pub fn assemble_block(&self, max_txs: usize) -> Block {
        let chain = self.chain.read();
        let height = chain.tip.height + 1;
        let parent = chain.tip.compute_hash();

        let overhead = Block::new(height, parent, Vec::new()).canonical_bytes().len();
        let byte_budget = self
            .config
            .max_block_size_bytes
            .saturating_sub(overhead + LENGTH_PREFIX_SLACK);
        let limit = max_txs.min(self.config.max_block_txs);

        let txs = self.mempool.lock().select_for_block(limit, byte_budget);
        debug!(height, txs = txs.len(), "assembled block template");
        Block::new(height, parent, txs)
    }

    /// Validates `block` against the tip and appends it without issuing
    /// a reward.
    pub fn append_block(&self, block: Block) -> Result<BlockHash, LedgerError> {
        let mut chain = self.chain.write();
        self.validate(&block, &chain.tip)?;
        let (hash, height, issued) = commit(&mut chain, block, Amount::ZERO);
        drop(chain);

        self.announce(height, hash, Amount::ZERO, issued);
        Ok(hash)
    }

    /// Appends a mined block and credits its reward.
    ///
    /// The reward comes from the [`RewardEngine`] and is clamped to the
    /// headroom left under `max_supply`. After the block is appended the
    /// miner's solve time is recorded for future reputation checks.
    /// Returns the credited reward. Invalid signals or an invalid block
    /// leave every piece of state untouched.
    pub fn accept_mined_block(
        &self,
        block: Block,
        miner_id: &str,
        signals: &MiningSignals,
        solve_time_secs: u64,
    ) -> Result<Amount, LedgerError> {
        let reward = self
            .rewards
            .compute_reward(miner_id, block.height, signals)?;

        let mut chain = self.chain.write();
        self.validate(&block, &chain.tip)?;

        let headroom = self
            .rewards
            .config()
            .max_supply
            .saturating_sub(chain.issued_supply);
        let credited = reward.min(headroom);
        if credited < reward {
            warn!(reward = %reward, credited = %credited, "reward clamped by supply cap");
        }
        let (hash, height, issued) = commit(&mut chain, block, credited);
        drop(chain);

        if let Some(miner) = MinerId::parse(miner_id) {
            self.rewards
                .tracker()
                .record_solve_time(&miner, solve_time_secs);
        }

        info!(height, miner = miner_id, reward = %credited, "mined block accepted");
        self.announce(height, hash, credited, issued);
        Ok(credited)
    }

    fn validate(&self, block: &Block, parent: &Block) -> Result<(), ValidationError> {
        let started = Instant::now();
        let result = self.validator.validate(block, parent);
        if let Some(m) = &self.metrics {
            m.block_validation_seconds
                .observe(started.elapsed().as_secs_f64());
        }
        if let Err(err) = &result {
            warn!(height = block.height, error = %err, "block rejected");
        }
        result
    }

    fn announce(&self, height: u64, hash: BlockHash, reward: Amount, issued_supply: Amount) {
        info!(height, hash = %hash.0.to_hex(), "block appended");
        self.sink.emit(LedgerEvent::BlockAppended {
            height,
            hash: hash.0,
            reward,
            issued_supply,
        });
    }

    /// Height of the current tip.
    pub fn height(&self) -> u64 {
        self.chain.read().tip.height
    }

    pub fn tip(&self) -> Block {
        self.chain.read().tip.clone()
    }

    pub fn tip_hash(&self) -> BlockHash {
        self.chain.read().tip.compute_hash()
    }

    pub fn block_at(&self, height: u64) -> Option<Block> {
        self.chain.read().store.block_at(height)
    }

    pub fn block(&self, hash: &BlockHash) -> Option<Block> {
        self.chain.read().store.get_block(hash)
    }

    /// Total block rewards credited so far.
    pub fn issued_supply(&self) -> Amount {
        self.chain.read().issued_supply
    }

    pub fn mempool_len(&self) -> usize {
        self.mempool.lock().len()
    }

    pub fn treasury_balance(&self) -> Amount {
        self.governance.treasury_balance()
    }
}

/// Persists an already-validated block and advances the tip.
fn commit<S: BlockStore>(
    chain: &mut ChainState<S>,
    block: Block,
    reward: Amount,
) -> (BlockHash, u64, Amount) {
    let hash = block.compute_hash();
    let height = block.height;
    chain.store.put_block(block.clone());
    chain.store.set_tip(hash);
    chain.tip = block;
    // `reward` never exceeds the headroom under the cap.
    chain.issued_supply = chain.issued_supply.saturating_add(reward);
    (hash, height, chain.issued_supply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::governance::ProposalStatus;
    use crate::reward::RewardConfig;
    use crate::types::{PublicKey, Signature};
    use ed25519_dalek::{Signer, SigningKey};
    use std::thread;
    fn dummy_ledger() -> (Ledger, Arc<EventLog>) {
        dummy_ledger_with(ChainConfig::default())
    }

    fn dummy_ledger_with(cfg: ChainConfig) -> (Ledger, Arc<EventLog>) {
        let log = Arc::new(EventLog::new());
        let ledger = Ledger::from_config(&cfg, log.clone()).expect("default config is valid");
        (ledger, log)
    }

    fn dummy_tx(n: u64, origin: &str) -> Transaction {
        Transaction::unsigned(
            Amount::from_coins(1 + n % 5),
            format!("tx-{n}").into_bytes(),
            1_700_000_000 + n,
            ChainId::new(origin),
        )
    }

    fn signed_tx(message: &[u8]) -> Transaction {
        let sk = SigningKey::from_bytes(&[11; 32]);
        let sig = sk.sign(message);
        Transaction::unsigned(Amount::from_coins(2), message.to_vec(), 1, ChainId::mainnet())
            .with_signature(
                Signature(sig.to_bytes().to_vec()),
                PublicKey(sk.verifying_key().as_bytes().to_vec()),
            )
    }

    fn cpu() -> MiningSignals {
        MiningSignals {
            declared_hashrate: 1_000.0,
            is_gpu: false,
        }
    }

    #[test]
    fn starts_at_genesis() {
        let (ledger, _) = dummy_ledger();
        assert_eq!(ledger.height(), 0);
        assert_eq!(ledger.tip(), Block::genesis());
        assert_eq!(ledger.block_at(0), Some(Block::genesis()));
        assert_eq!(ledger.issued_supply(), Amount::ZERO);
    }

    #[test]
    fn mainnet_transaction_is_queued() {
        let (ledger, log) = dummy_ledger();
        let tx = dummy_tx(1, "mainnet");
        let hash = tx.compute_hash();

        assert_eq!(ledger.submit_transaction(tx), Ok(Admission::Accepted(hash)));
        assert_eq!(ledger.mempool_len(), 1);
        assert!(matches!(
            log.drain().as_slice(),
            [LedgerEvent::TransactionAccepted { .. }]
        ));
    }

    #[test]
    fn unknown_origin_is_rejected_with_reason() {
        let (ledger, log) = dummy_ledger();
        let err = ledger
            .submit_transaction(dummy_tx(1, "unknown_chain"))
            .unwrap_err();

        assert_eq!(err.code(), "unauthorized_origin");
        assert_eq!(ledger.mempool_len(), 0);
        assert_eq!(ledger.gate().scorer().buffered(), 0);
        assert!(matches!(
            log.drain().as_slice(),
            [LedgerEvent::OriginRejected { .. }]
        ));
    }

    #[test]
    fn authorized_sidechain_transaction_passes_cold_start() {
        let (ledger, _) = dummy_ledger();
        for n in 0..10 {
            let admission = ledger.submit_transaction(dummy_tx(n, "sidechain_1")).unwrap();
            assert!(admission.is_accepted());
        }
        assert_eq!(ledger.gate().scorer().buffered(), 10);
    }

    #[test]
    fn signatures_are_checked() {
        let (ledger, log) = dummy_ledger();
        assert!(ledger.submit_transaction(signed_tx(b"pay bob 2")).is_ok());

        let mut forged = signed_tx(b"pay bob 2");
        forged.message = b"pay bob 200".to_vec();
        assert_eq!(
            ledger.submit_transaction(forged),
            Err(LedgerError::VerificationFailure)
        );

        let rejected = log
            .drain()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    LedgerEvent::TransactionRejected {
                        reason: "verification_failure",
                        ..
                    }
                )
            })
            .count();
        assert_eq!(rejected, 1);
    }

    #[test]
    fn malformed_transactions_are_rejected() {
        let (ledger, _) = dummy_ledger();

        let half_signed = dummy_tx(1, "mainnet").with_signature(Signature(vec![1; 64]), PublicKey::default());
        assert_eq!(ledger.submit_transaction(half_signed).unwrap_err().code(), "malformed");

        assert_eq!(ledger.submit_transaction(dummy_tx(1, " ")).unwrap_err().code(), "malformed");

        let mut long = dummy_tx(1, "mainnet");
        long.message = vec![0; ledger.config().max_message_len + 1];
        assert_eq!(ledger.submit_transaction(long).unwrap_err().code(), "malformed");
    }

    #[test]
    fn mempool_capacity_is_enforced() {
        let mut cfg = ChainConfig::default();
        cfg.ledger.mempool_capacity = 1;
        let (ledger, _) = dummy_ledger_with(cfg);

        ledger.submit_transaction(dummy_tx(1, "mainnet")).unwrap();
        assert_eq!(
            ledger.submit_transaction(dummy_tx(2, "mainnet")),
            Err(LedgerError::MempoolFull(1))
        );
    }

    #[test]
    fn assembled_block_appends_on_tip() {
        let (ledger, log) = dummy_ledger();
        for n in 0..3 {
            ledger.submit_transaction(dummy_tx(n, "mainnet")).unwrap();
        }

        let block = ledger.assemble_block(2);
        assert_eq!(block.height, 1);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(ledger.mempool_len(), 1);

        let hash = ledger.append_block(block.clone()).unwrap();
        assert_eq!(ledger.tip_hash(), hash);
        assert_eq!(ledger.block(&hash), Some(block));
        assert_eq!(ledger.height(), 1);
        assert_eq!(ledger.issued_supply(), Amount::ZERO);
        assert!(log
            .drain()
            .iter()
            .any(|e| matches!(e, LedgerEvent::BlockAppended { height: 1, .. })));
    }

    #[test]
    fn stale_block_is_rejected() {
        let (ledger, _) = dummy_ledger();
        let first = ledger.assemble_block(10);
        let stale = first.clone();
        ledger.append_block(first).unwrap();

        let err = ledger.append_block(stale).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidBlock(ValidationError::HeightMismatch { expected: 2, got: 1 })
        ));
        assert_eq!(ledger.height(), 1);
    }

    #[test]
    fn mined_block_credits_reward_and_records_solve_time() {
        let (ledger, _) = dummy_ledger();
        let block = ledger.assemble_block(10);

        let reward = ledger.accept_mined_block(block, "solo-1", &cpu(), 90).unwrap();
        assert_eq!(reward, Amount::from_coins(55));
        assert_eq!(ledger.issued_supply(), Amount::from_coins(55));

        let miner = MinerId::parse("solo-1").unwrap();
        assert_eq!(ledger.rewards().tracker().solve_times(&miner), vec![90]);
    }

    #[test]
    fn invalid_signal_leaves_chain_untouched() {
        let (ledger, _) = dummy_ledger();
        let block = ledger.assemble_block(10);
        let bad = MiningSignals {
            declared_hashrate: -1.0,
            is_gpu: false,
        };

        let err = ledger.accept_mined_block(block, "solo-1", &bad, 90).unwrap_err();
        assert_eq!(err.code(), "invalid_signal");
        assert_eq!(ledger.height(), 0);
        assert_eq!(ledger.rewards().tracker().tracked_miners(), 0);
    }

    #[test]
    fn supply_cap_clamps_rewards() {
        let mut cfg = ChainConfig::default();
        cfg.reward = RewardConfig {
            max_supply: Amount::from_coins(60),
            ..RewardConfig::default()
        };
        let (ledger, _) = dummy_ledger_with(cfg);

        let first = ledger
            .accept_mined_block(ledger.assemble_block(0), "solo-1", &cpu(), 90)
            .unwrap();
        let second = ledger
            .accept_mined_block(ledger.assemble_block(0), "solo-1", &cpu(), 90)
            .unwrap();
        let third = ledger
            .accept_mined_block(ledger.assemble_block(0), "solo-1", &cpu(), 90)
            .unwrap();

        assert_eq!(first, Amount::from_coins(55));
        assert_eq!(second, Amount::from_coins(5));
        assert_eq!(third, Amount::ZERO);
        assert_eq!(ledger.issued_supply(), Amount::from_coins(60));
        assert_eq!(ledger.height(), 3);
    }

    #[test]
    fn governance_is_reachable_through_ledger() {
        let (ledger, _) = dummy_ledger();
        let gov = ledger.governance();
        let id = gov
            .submit("audit", "security audit", Amount::from_coins(1_000), "alice")
            .unwrap();
        gov.vote(id, "bob", true).unwrap();
        gov.vote(id, "carol", true).unwrap();
        gov.execute(id).unwrap();

        assert_eq!(gov.proposal(id).unwrap().status, ProposalStatus::Executed);
        assert_eq!(
            ledger.treasury_balance(),
            Amount::from_coins(10_000_000 - 1_000)
        );
    }

    #[test]
    fn metrics_gauges_are_seeded_at_startup() {
        let registry = prometheus::Registry::new();
        let metrics = LedgerMetrics::register(&registry).unwrap();
        let (ledger, _) = dummy_ledger();
        let ledger = ledger.with_metrics(metrics.clone());

        assert_eq!(metrics.treasury_balance.get(), 10_000_000.0);
        assert_eq!(metrics.issued_supply.get(), 0.0);
        assert_eq!(ledger.treasury_balance(), Amount::from_coins(10_000_000));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn ledger_is_shareable_across_threads() {
        assert_send_sync::<Ledger>();
        assert_send_sync::<GovernanceRegistry>();
        assert_send_sync::<SidechainGate>();
    }

    #[test]
    fn concurrent_votes_are_all_counted_and_decide_once() {
        let mut cfg = ChainConfig::default();
        cfg.governance.tally = crate::governance::TallyPolicy::Majority { electorate: 15 };
        let (ledger, log) = dummy_ledger_with(cfg);
        let ledger = Arc::new(ledger);
        let id = ledger
            .governance()
            .submit("grant", "d", Amount::from_coins(10), "alice")
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || ledger.governance().vote(id, &format!("voter-{n}"), true))
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(outcomes.iter().all(|o| o.is_ok()));
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == Ok(ProposalStatus::Approved))
                .count(),
            1
        );
        let proposal = ledger.governance().proposal(id).unwrap();
        assert_eq!(proposal.votes.len(), 8);
        assert_eq!(proposal.status, ProposalStatus::Approved);

        let decided = log
            .drain()
            .into_iter()
            .filter(|e| matches!(e, LedgerEvent::ProposalDecided { .. }))
            .count();
        assert_eq!(decided, 1);
    }

    #[test]
    fn concurrent_submissions_keep_scorer_and_mempool_consistent() {
        let (ledger, _) = dummy_ledger();
        let ledger = Arc::new(ledger);

        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    let mut accepted = 0;
                    for i in 0..10 {
                        let tx = dummy_tx(worker * 100 + i, "sidechain_1");
                        if ledger.submit_transaction(tx).unwrap().is_accepted() {
                            accepted += 1;
                        }
                    }
                    accepted
                })
            })
            .collect();
        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(ledger.gate().scorer().buffered(), 80);
        assert_eq!(ledger.mempool_len(), accepted);
    }

    #[test]
    fn concurrent_mining_records_every_solve_time() {
        let (ledger, _) = dummy_ledger();
        let tracker = ledger.rewards().tracker();

        thread::scope(|scope| {
            for worker in 0..4 {
                scope.spawn(move || {
                    let miner = MinerId::parse(&format!("miner-{worker}")).unwrap();
                    for s in 0..25 {
                        tracker.record_solve_time(&miner, s);
                    }
                });
            }
        });

        assert_eq!(tracker.tracked_miners(), 4);
        for worker in 0..4 {
            let miner = MinerId::parse(&format!("miner-{worker}")).unwrap();
            assert_eq!(tracker.solve_times(&miner), (15..25u64).collect::<Vec<_>>());
        }
    }
}
