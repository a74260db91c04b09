//! Treasury proposals and the protocol-update signature quorum.
//!
//! Proposal state and the treasury live under one mutex: a vote or an
//! execution either applies completely or not at all, and a debit can
//! never interleave with another execution's sufficiency check.
//!
//! The governance key set is separate. It gates protocol updates through
//! [`GovernanceRegistry::verify_update_signature`] and has nothing to do
//! with treasury votes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ed25519_dalek::{PUBLIC_KEY_LENGTH, VerifyingKey};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::config::GovernanceConfig;
use super::error::GovernanceError;
use super::proposal::{Proposal, ProposalId, ProposalStatus, TallyPolicy};
use super::treasury::Treasury;
use crate::config::ConfigError;
use crate::events::{EventSink, LedgerEvent};
use crate::types::{Amount, PublicKey};
use crate::validation::SignatureVerifier;

struct ProposalBook {
    proposals: BTreeMap<ProposalId, Proposal>,
    next_id: u64,
    treasury: Treasury,
}

/// Governance state: proposals, treasury, and update-signing keys.
pub struct GovernanceRegistry {
    book: Mutex<ProposalBook>,
    keys: RwLock<Vec<PublicKey>>,
    required_signatures: usize,
    policy: TallyPolicy,
    verifier: SignatureVerifier,
    sink: Arc<dyn EventSink>,
}

impl GovernanceRegistry {
    pub fn new(
        treasury: Amount,
        keys: Vec<PublicKey>,
        required_signatures: usize,
        policy: TallyPolicy,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let mut unique: Vec<PublicKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self {
            book: Mutex::new(ProposalBook {
                proposals: BTreeMap::new(),
                next_id: 1,
                treasury: Treasury::new(treasury),
            }),
            keys: RwLock::new(unique),
            required_signatures,
            policy,
            verifier: SignatureVerifier::default(),
            sink,
        }
    }

    pub fn from_config(cfg: &GovernanceConfig, sink: Arc<dyn EventSink>) -> Result<Self, ConfigError> {
        let keys = cfg.decoded_keys()?;
        Ok(Self::new(
            cfg.treasury_balance,
            keys,
            cfg.required_signatures,
            cfg.tally,
            sink,
        ))
    }

    pub fn required_signatures(&self) -> usize {
        self.required_signatures
    }

    pub fn tally_policy(&self) -> TallyPolicy {
        self.policy
    }

    /// Creates a pending proposal and returns its id.
    ///
    /// `requested_funds` must be positive and covered by the treasury at
    /// submission time. Execution checks the balance again.
    pub fn submit(
        &self,
        title: &str,
        description: &str,
        requested_funds: Amount,
        proposer: &str,
    ) -> Result<ProposalId, GovernanceError> {
        if title.trim().is_empty() {
            return Err(GovernanceError::InvalidProposal("empty title".into()));
        }
        if proposer.trim().is_empty() {
            return Err(GovernanceError::InvalidProposal("empty proposer".into()));
        }
        if requested_funds.is_zero() {
            return Err(GovernanceError::InvalidProposal(
                "requested funds must be positive".into(),
            ));
        }

        let mut book = self.book.lock();
        if !book.treasury.can_cover(requested_funds) {
            return Err(GovernanceError::InsufficientTreasury {
                requested: requested_funds,
                available: book.treasury.balance(),
            });
        }

        let id = ProposalId(book.next_id);
        book.next_id += 1;
        book.proposals.insert(
            id,
            Proposal {
                id,
                title: title.to_owned(),
                description: description.to_owned(),
                requested_funds,
                proposer: proposer.to_owned(),
                votes: BTreeMap::new(),
                status: ProposalStatus::Pending,
            },
        );
        drop(book);

        info!(%id, proposer, requested = %requested_funds, "proposal submitted");
        self.sink.emit(LedgerEvent::ProposalSubmitted {
            id,
            proposer: proposer.to_owned(),
            requested_funds,
        });
        Ok(id)
    }

    /// Records a vote and returns the proposal status after tallying.
    ///
    /// Checks run in order: unknown id, duplicate voter, then
    /// `Pending` state. No check failure touches the proposal.
    pub fn vote(
        &self,
        id: ProposalId,
        voter: &str,
        approve: bool,
    ) -> Result<ProposalStatus, GovernanceError> {
        let mut book = self.book.lock();
        let proposal = book
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;

        if proposal.has_voted(voter) {
            return Err(GovernanceError::DuplicateVote {
                proposal: id,
                voter: voter.to_owned(),
            });
        }
        if proposal.status != ProposalStatus::Pending {
            return Err(GovernanceError::InvalidState {
                proposal: id,
                status: proposal.status,
                operation: "vote on",
            });
        }

        proposal.votes.insert(voter.to_owned(), approve);
        debug!(%id, voter, approve, "vote recorded");

        let decided = self
            .policy
            .decide(proposal.approvals(), proposal.rejections());
        if let Some(status) = decided {
            proposal.status = status;
        }
        let status = proposal.status;
        drop(book);

        if let Some(status) = decided {
            info!(%id, ?status, "proposal decided");
            self.sink.emit(LedgerEvent::ProposalDecided { id, status });
        }
        Ok(status)
    }

    /// Pays out an approved proposal and returns the new treasury balance.
    ///
    /// On `InsufficientTreasury` the proposal stays `Approved` so a later
    /// call can retry after a deposit.
    pub fn execute(&self, id: ProposalId) -> Result<Amount, GovernanceError> {
        let (amount, remaining) = {
            let mut guard = self.book.lock();
            let book = &mut *guard;
            let proposal = book
                .proposals
                .get_mut(&id)
                .ok_or(GovernanceError::UnknownProposal(id))?;

            if proposal.status != ProposalStatus::Approved {
                return Err(GovernanceError::InvalidState {
                    proposal: id,
                    status: proposal.status,
                    operation: "execute",
                });
            }

            let amount = proposal.requested_funds;
            let remaining = match book.treasury.debit(amount) {
                Ok(remaining) => remaining,
                Err(err) => {
                    warn!(%id, requested = %amount, available = %book.treasury.balance(),
                        "treasury cannot cover approved proposal");
                    return Err(err);
                }
            };
            proposal.status = ProposalStatus::Executed;
            (amount, remaining)
        };

        info!(%id, amount = %amount, treasury = %remaining, "proposal executed");
        self.sink.emit(LedgerEvent::ProposalExecuted {
            id,
            amount,
            treasury_balance: remaining,
        });
        Ok(remaining)
    }

    /// Returns `true` iff at least `required_signatures` distinct
    /// governance keys produced a valid signature over `update`.
    ///
    /// Signatures are hex-encoded. Each key counts at most once, however
    /// many of the supplied signatures it matches. Undecodable or invalid
    /// signatures are ignored.
    pub fn verify_update_signature<I, S>(&self, update: &[u8], signatures: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let supplied: BTreeSet<String> = signatures
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_lowercase())
            .collect();

        let keys = self.keys.read();
        let signers = keys
            .iter()
            .filter(|key| {
                supplied
                    .iter()
                    .any(|sig| self.verifier.verify_hex(update, sig, key.as_bytes()))
            })
            .count();
        drop(keys);

        let accepted = signers >= self.required_signatures;
        debug!(
            signers,
            required = self.required_signatures,
            accepted,
            "checked update signatures"
        );
        accepted
    }

    /// Registers a governance key. Returns `false` if already present.
    pub fn add_governance_key(&self, key: PublicKey) -> Result<bool, GovernanceError> {
        let Ok(bytes) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(key.as_bytes()) else {
            return Err(GovernanceError::InvalidKey(format!(
                "expected {PUBLIC_KEY_LENGTH} bytes, got {}",
                key.as_bytes().len()
            )));
        };
        if VerifyingKey::from_bytes(&bytes).is_err() {
            return Err(GovernanceError::InvalidKey(
                "not a valid Ed25519 point".into(),
            ));
        }

        let mut keys = self.keys.write();
        if keys.contains(&key) {
            return Ok(false);
        }
        info!(key = %hex::encode(key.as_bytes()), "governance key added");
        keys.push(key);
        Ok(true)
    }

    /// Removes a governance key. Returns `false` if it was not registered.
    pub fn remove_governance_key(&self, key: &PublicKey) -> bool {
        let mut keys = self.keys.write();
        let before = keys.len();
        keys.retain(|k| k != key);
        let removed = keys.len() != before;
        if removed {
            info!(key = %hex::encode(key.as_bytes()), "governance key removed");
        }
        removed
    }

    pub fn governance_keys(&self) -> Vec<PublicKey> {
        self.keys.read().clone()
    }

    /// Snapshot of one proposal.
    pub fn proposal(&self, id: ProposalId) -> Option<Proposal> {
        self.book.lock().proposals.get(&id).cloned()
    }

    /// Snapshot of every proposal, in id order.
    pub fn proposals(&self) -> Vec<Proposal> {
        self.book.lock().proposals.values().cloned().collect()
    }

    pub fn treasury_balance(&self) -> Amount {
        self.book.lock().treasury.balance()
    }

    /// Credits the treasury and returns the new balance.
    pub fn deposit_treasury(&self, amount: Amount) -> Result<Amount, GovernanceError> {
        let balance = self.book.lock().treasury.credit(amount)?;
        info!(amount = %amount, treasury = %balance, "treasury deposit");
        self.sink.emit(LedgerEvent::TreasuryDeposited {
            amount,
            treasury_balance: balance,
        });
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{OnceLock, Weak};

    use crate::events::EventLog;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn public_key(seed: u8) -> PublicKey {
        PublicKey(signing_key(seed).verifying_key().as_bytes().to_vec())
    }

    fn registry_with(treasury: u64, log: Arc<EventLog>) -> GovernanceRegistry {
        GovernanceRegistry::new(
            Amount::from_coins(treasury),
            vec![public_key(1), public_key(2), public_key(3)],
            2,
            TallyPolicy::default(),
            log,
        )
    }

    fn dummy_registry(treasury: u64) -> GovernanceRegistry {
        registry_with(treasury, Arc::new(EventLog::new()))
    }

    fn sign_hex(seed: u8, msg: &[u8]) -> String {
        hex::encode(signing_key(seed).sign(msg).to_bytes())
    }

    #[test]
    fn approve_then_execute_debits_exactly() {
        let log = Arc::new(EventLog::new());
        let reg = registry_with(1_000, log.clone());
        let id = reg
            .submit("grant", "fund the explorer", Amount::from_coins(250), "alice")
            .unwrap();

        assert_eq!(reg.vote(id, "bob", true).unwrap(), ProposalStatus::Pending);
        assert_eq!(reg.vote(id, "carol", true).unwrap(), ProposalStatus::Approved);

        let remaining = reg.execute(id).unwrap();
        assert_eq!(remaining, Amount::from_coins(750));
        assert_eq!(reg.treasury_balance(), Amount::from_coins(750));
        assert_eq!(reg.proposal(id).unwrap().status, ProposalStatus::Executed);

        let kinds: Vec<_> = log
            .drain()
            .into_iter()
            .map(|e| match e {
                LedgerEvent::ProposalSubmitted { .. } => "submitted",
                LedgerEvent::ProposalDecided { .. } => "decided",
                LedgerEvent::ProposalExecuted { .. } => "executed",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["submitted", "decided", "executed"]);
    }

    #[test]
    fn duplicate_vote_is_rejected_without_changes() {
        let reg = dummy_registry(1_000);
        let id = reg.submit("t", "d", Amount::from_coins(1), "alice").unwrap();
        reg.vote(id, "bob", true).unwrap();
        reg.vote(id, "carol", true).unwrap();
        let before = reg.proposal(id).unwrap();

        match reg.vote(id, "bob", false) {
            Err(GovernanceError::DuplicateVote { proposal, voter }) => {
                assert_eq!(proposal, id);
                assert_eq!(voter, "bob");
            }
            other => panic!("expected DuplicateVote, got {other:?}"),
        }
        assert_eq!(reg.proposal(id).unwrap(), before);
    }

    #[test]
    fn vote_on_decided_proposal_is_invalid_state() {
        let reg = dummy_registry(1_000);
        let id = reg.submit("t", "d", Amount::from_coins(1), "alice").unwrap();
        reg.vote(id, "bob", false).unwrap();
        assert_eq!(reg.vote(id, "carol", false).unwrap(), ProposalStatus::Rejected);

        let err = reg.vote(id, "dave", true).unwrap_err();
        assert_eq!(err.code(), "invalid_state");
        assert!(matches!(
            reg.execute(id),
            Err(GovernanceError::InvalidState {
                status: ProposalStatus::Rejected,
                ..
            })
        ));
    }

    #[test]
    fn unknown_proposal_is_reported() {
        let reg = dummy_registry(10);
        assert_eq!(
            reg.vote(ProposalId(42), "bob", true),
            Err(GovernanceError::UnknownProposal(ProposalId(42)))
        );
        assert_eq!(
            reg.execute(ProposalId(42)),
            Err(GovernanceError::UnknownProposal(ProposalId(42)))
        );
    }

    #[test]
    fn pending_proposal_cannot_execute() {
        let reg = dummy_registry(10);
        let id = reg.submit("t", "d", Amount::from_coins(1), "alice").unwrap();
        assert!(matches!(
            reg.execute(id),
            Err(GovernanceError::InvalidState {
                status: ProposalStatus::Pending,
                ..
            })
        ));
    }

    #[test]
    fn insufficient_treasury_keeps_proposal_approved() {
        let reg = dummy_registry(100);
        let first = reg.submit("a", "d", Amount::from_coins(80), "alice").unwrap();
        let second = reg.submit("b", "d", Amount::from_coins(50), "alice").unwrap();
        for id in [first, second] {
            reg.vote(id, "bob", true).unwrap();
            reg.vote(id, "carol", true).unwrap();
        }

        reg.execute(first).unwrap();
        match reg.execute(second) {
            Err(GovernanceError::InsufficientTreasury {
                requested,
                available,
            }) => {
                assert_eq!(requested, Amount::from_coins(50));
                assert_eq!(available, Amount::from_coins(20));
            }
            other => panic!("expected InsufficientTreasury, got {other:?}"),
        }
        assert_eq!(reg.proposal(second).unwrap().status, ProposalStatus::Approved);
        assert_eq!(reg.treasury_balance(), Amount::from_coins(20));

        // Retry succeeds once the treasury recovers.
        reg.deposit_treasury(Amount::from_coins(30)).unwrap();
        assert_eq!(reg.execute(second).unwrap(), Amount::ZERO);
        assert_eq!(reg.proposal(second).unwrap().status, ProposalStatus::Executed);
    }

    #[test]
    fn executed_proposal_cannot_execute_twice() {
        let reg = dummy_registry(100);
        let id = reg.submit("t", "d", Amount::from_coins(10), "alice").unwrap();
        reg.vote(id, "bob", true).unwrap();
        reg.vote(id, "carol", true).unwrap();
        reg.execute(id).unwrap();

        assert!(matches!(
            reg.execute(id),
            Err(GovernanceError::InvalidState {
                status: ProposalStatus::Executed,
                ..
            })
        ));
        assert_eq!(reg.treasury_balance(), Amount::from_coins(90));
    }

    #[test]
    fn submit_validates_input() {
        let reg = dummy_registry(10);
        assert_eq!(
            reg.submit("t", "d", Amount::ZERO, "alice").unwrap_err().code(),
            "invalid_proposal"
        );
        assert_eq!(
            reg.submit(" ", "d", Amount(1), "alice").unwrap_err().code(),
            "invalid_proposal"
        );
        assert_eq!(
            reg.submit("t", "d", Amount::from_coins(11), "alice")
                .unwrap_err()
                .code(),
            "insufficient_treasury"
        );
        assert!(reg.proposals().is_empty());

        let a = reg.submit("t", "d", Amount(1), "alice").unwrap();
        let b = reg.submit("t", "d", Amount(1), "alice").unwrap();
        assert_eq!((a, b), (ProposalId(1), ProposalId(2)));
    }

    #[test]
    fn update_quorum_counts_distinct_valid_keys() {
        let reg = dummy_registry(0);
        let update = b"protocol v2";

        let one = [sign_hex(1, update), "zz".into(), sign_hex(9, update)];
        assert!(!reg.verify_update_signature(update, &one));

        let two = [sign_hex(1, update), sign_hex(2, update)];
        assert!(reg.verify_update_signature(update, &two));

        let duplicated = [sign_hex(1, update), sign_hex(1, update), sign_hex(1, update)];
        assert!(!reg.verify_update_signature(update, &duplicated));

        // Valid signatures over a different payload do not count.
        let wrong = [sign_hex(1, b"other"), sign_hex(2, b"other")];
        assert!(!reg.verify_update_signature(update, &wrong));
    }

    #[test]
    fn quorum_tracks_key_administration() {
        let reg = dummy_registry(0);
        let update = b"u";
        let sigs = [sign_hex(2, update), sign_hex(4, update)];
        assert!(!reg.verify_update_signature(update, &sigs));

        assert_eq!(reg.add_governance_key(public_key(4)), Ok(true));
        assert_eq!(reg.add_governance_key(public_key(4)), Ok(false));
        assert!(reg.verify_update_signature(update, &sigs));

        assert!(reg.remove_governance_key(&public_key(2)));
        assert!(!reg.remove_governance_key(&public_key(2)));
        assert!(!reg.verify_update_signature(update, &sigs));

        assert_eq!(
            reg.add_governance_key(PublicKey(vec![1; 5])).unwrap_err().code(),
            "invalid_key"
        );
    }

    #[test]
    fn duplicated_key_counts_once_toward_quorum() {
        let reg = GovernanceRegistry::new(
            Amount::ZERO,
            vec![public_key(1), public_key(1), public_key(2)],
            2,
            TallyPolicy::default(),
            Arc::new(EventLog::new()),
        );
        assert_eq!(reg.governance_keys(), vec![public_key(1), public_key(2)]);

        let update = b"raise block size";
        assert!(!reg.verify_update_signature(update, [sign_hex(1, update)]));
        assert!(reg.verify_update_signature(update, [sign_hex(1, update), sign_hex(2, update)]));
    }

    #[test]
    fn from_config_rejects_duplicated_key() {
        let key = hex::encode(public_key(1).as_bytes());
        let cfg = GovernanceConfig {
            keys: vec![key.clone(), key],
            required_signatures: 2,
            ..GovernanceConfig::default()
        };
        assert!(matches!(
            GovernanceRegistry::from_config(&cfg, Arc::new(EventLog::new())),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    /// Sink that reads the registry back while handling an event.
    struct ReadBackSink {
        registry: OnceLock<Weak<GovernanceRegistry>>,
        seen: Mutex<Vec<Amount>>,
    }

    impl EventSink for ReadBackSink {
        fn emit(&self, event: LedgerEvent) {
            if let LedgerEvent::ProposalExecuted { .. } | LedgerEvent::TreasuryDeposited { .. } =
                event
            {
                if let Some(reg) = self.registry.get().and_then(Weak::upgrade) {
                    let balance = reg.treasury_balance();
                    let _ = reg.proposals();
                    self.seen.lock().push(balance);
                }
            }
        }
    }

    #[test]
    fn sinks_may_read_the_registry_while_handling_events() {
        let sink = Arc::new(ReadBackSink {
            registry: OnceLock::new(),
            seen: Mutex::new(Vec::new()),
        });
        let reg = Arc::new(GovernanceRegistry::new(
            Amount::from_coins(100),
            Vec::new(),
            1,
            TallyPolicy::default(),
            sink.clone(),
        ));
        sink.registry.set(Arc::downgrade(&reg)).unwrap();

        let id = reg.submit("t", "d", Amount::from_coins(40), "alice").unwrap();
        reg.vote(id, "bob", true).unwrap();
        reg.vote(id, "carol", true).unwrap();
        reg.execute(id).unwrap();
        reg.deposit_treasury(Amount::from_coins(5)).unwrap();

        assert_eq!(
            *sink.seen.lock(),
            vec![Amount::from_coins(60), Amount::from_coins(65)]
        );
    }

    #[test]
    fn deposit_is_reported_to_the_sink() {
        let log = Arc::new(EventLog::new());
        let reg = registry_with(10, log.clone());
        assert_eq!(reg.deposit_treasury(Amount::from_coins(2)), Ok(Amount::from_coins(12)));
        assert_eq!(
            log.drain(),
            vec![LedgerEvent::TreasuryDeposited {
                amount: Amount::from_coins(2),
                treasury_balance: Amount::from_coins(12),
            }]
        );
    }

    #[test]
    fn from_config_rejects_bad_keys() {
        let cfg = GovernanceConfig {
            keys: vec!["abcd".into()],
            ..GovernanceConfig::default()
        };
        assert!(matches!(
            GovernanceRegistry::from_config(&cfg, Arc::new(EventLog::new())),
            Err(ConfigError::InvalidKey(_))
        ));
    }
}
