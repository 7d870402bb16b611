//! Treasury proposals and their lifecycle.

use dao_types::{Address, Timestamp, TokenAmount, VoteChoice, VoteWeight};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an executed proposal did not pay out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Yes weight fell short of the registry's `min_voting_threshold`.
    ThresholdNotMet,
    /// Yes weight did not strictly exceed no weight.
    MajorityNotReached,
}

/// Terminal result recorded when a proposal is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalOutcome {
    /// The action amount was transferred to the target.
    Passed,
    /// Marked executed without moving funds.
    Rejected(RejectReason),
}

impl ProposalOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for ProposalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Rejected(RejectReason::ThresholdNotMet) => {
                write!(f, "rejected (threshold not met)")
            }
            Self::Rejected(RejectReason::MajorityNotReached) => {
                write!(f, "rejected (no majority)")
            }
        }
    }
}

/// Where a proposal sits in its lifecycle at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Window open; votes accepted.
    Voting,
    /// Window closed; waiting for someone to execute it.
    AwaitingExecution,
    Passed,
    Rejected,
}

/// A time-bounded request to pay `action_amount` from the treasury to
/// `action_target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// The proposal's own derived address.
    pub address: Address,
    /// Owning registry (identity only).
    pub registry: Address,
    pub proposer: Address,
    /// Caller-chosen index that, with registry and proposer, derives the address.
    pub index: u64,
    pub description: String,
    pub action_amount: TokenAmount,
    /// Token account that receives the payout.
    pub action_target: Address,
    pub yes_weight: VoteWeight,
    pub no_weight: VoteWeight,
    pub votes_cast: u64,
    pub created_at: Timestamp,
    pub executed: bool,
    /// Set together with `executed`.
    pub outcome: Option<ProposalOutcome>,
}

impl Proposal {
    /// Combined weight counted toward quorum. Widened so it cannot overflow.
    pub fn total_weight(&self) -> u128 {
        self.yes_weight as u128 + self.no_weight as u128
    }

    /// Add `weight` to one side of the tally.
    ///
    /// Returns `None` on overflow, leaving the tally untouched.
    pub fn record_vote(&mut self, choice: VoteChoice, weight: VoteWeight) -> Option<()> {
        let votes_cast = self.votes_cast.checked_add(1)?;
        match choice {
            VoteChoice::Yes => self.yes_weight = self.yes_weight.checked_add(weight)?,
            VoteChoice::No => self.no_weight = self.no_weight.checked_add(weight)?,
        }
        self.votes_cast = votes_cast;
        Some(())
    }

    /// Decide the outcome of a proposal that has reached quorum.
    ///
    /// Passing needs yes weight at or above `min_voting_threshold` and
    /// strictly above no weight.
    pub fn decide(&self, min_voting_threshold: u64) -> ProposalOutcome {
        if self.yes_weight < min_voting_threshold {
            ProposalOutcome::Rejected(RejectReason::ThresholdNotMet)
        } else if self.yes_weight <= self.no_weight {
            ProposalOutcome::Rejected(RejectReason::MajorityNotReached)
        } else {
            ProposalOutcome::Passed
        }
    }

    /// Lifecycle status at `now`, given the voting deadline.
    pub fn status(&self, now: Timestamp, deadline: Timestamp) -> ProposalStatus {
        match self.outcome {
            Some(ProposalOutcome::Passed) => ProposalStatus::Passed,
            Some(ProposalOutcome::Rejected(_)) => ProposalStatus::Rejected,
            None if now <= deadline => ProposalStatus::Voting,
            None => ProposalStatus::AwaitingExecution,
        }
    }
}
