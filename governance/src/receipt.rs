//! Vote receipts.

use dao_types::{Address, Timestamp, VoteChoice, VoteWeight};
use serde::{Deserialize, Serialize};

/// Immutable record of one voter's ballot on one proposal.
///
/// Lives at `receipt_address(proposal, voter)`, so a second receipt for the
/// same pair cannot be created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub proposal: Address,
    pub voter: Address,
    pub choice: VoteChoice,
    pub weight: VoteWeight,
    pub cast_at: Timestamp,
}
