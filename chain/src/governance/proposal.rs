//! Treasury proposals and vote tallying.
//!
//! Lifecycle: `Pending → Approved | Rejected`, then `Approved → Executed`.
//! `Rejected` and `Executed` are terminal.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Amount;

/// Sequential proposal identifier.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
    Executed,
}

impl ProposalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProposalStatus::Rejected | ProposalStatus::Executed)
    }
}

/// A request to spend treasury funds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub requested_funds: Amount,
    pub proposer: String,
    /// Voter id → approve.
    pub votes: BTreeMap<String, bool>,
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn has_voted(&self, voter: &str) -> bool {
        self.votes.contains_key(voter)
    }

    pub fn approvals(&self) -> u32 {
        self.votes.values().filter(|&&v| v).count() as u32
    }

    pub fn rejections(&self) -> u32 {
        self.votes.values().filter(|&&v| !v).count() as u32
    }
}

/// When a pending proposal leaves `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TallyPolicy {
    /// Approved once `approvals` approve; rejected once `rejections`
    /// reject. Approval is checked first.
    Threshold { approvals: u32, rejections: u32 },
    /// Simple majority of a fixed electorate. Rejected as soon as a
    /// majority is no longer reachable.
    Majority { electorate: u32 },
}

impl Default for TallyPolicy {
    fn default() -> Self {
        TallyPolicy::Threshold {
            approvals: 2,
            rejections: 2,
        }
    }
}

impl TallyPolicy {
    /// Decision for the given counts, or `None` to stay pending.
    pub fn decide(self, approvals: u32, rejections: u32) -> Option<ProposalStatus> {
        match self {
            TallyPolicy::Threshold {
                approvals: need_yes,
                rejections: need_no,
            } => {
                if approvals >= need_yes {
                    Some(ProposalStatus::Approved)
                } else if rejections >= need_no {
                    Some(ProposalStatus::Rejected)
                } else {
                    None
                }
            }
            TallyPolicy::Majority { electorate } => {
                let majority = electorate / 2 + 1;
                if approvals >= majority {
                    Some(ProposalStatus::Approved)
                } else if rejections > electorate.saturating_sub(majority) {
                    Some(ProposalStatus::Rejected)
                } else {
                    None
                }
            }
        }
    }

    /// Whether the policy can ever decide a proposal.
    pub fn is_satisfiable(self) -> bool {
        match self {
            TallyPolicy::Threshold {
                approvals,
                rejections,
            } => approvals > 0 && rejections > 0,
            TallyPolicy::Majority { electorate } => electorate > 0,
        }
    }
}
