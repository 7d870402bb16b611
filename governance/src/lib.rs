//! Treasury governance for a single governed token.
//!
//! A registry is created once per token and seeded with treasury funds.
//! Holders above a creation threshold open proposals that ask the treasury
//! to pay a fixed amount to a recipient. Holders vote once each, weighted by
//! the integer square root of their balance at vote time. Once the voting
//! window closes anyone may execute the proposal: quorum is checked, then
//! the tally decides between paying out and a terminal rejection.
//!
//! Uniqueness of registries, proposals and vote receipts comes from their
//! derived addresses plus the store's insert-if-absent `create_at`.

pub mod engine;
pub mod error;
pub mod params;
pub mod proposal;
pub mod receipt;
pub mod registry;
mod transition;
pub mod weight;

pub use engine::{GovernanceEngine, ProposalRequest};
pub use error::{EntityKind, GovernanceError};
pub use params::{RegistryPolicy, MAX_DESCRIPTION_LEN};
pub use proposal::{Proposal, ProposalOutcome, ProposalStatus, RejectReason};
pub use receipt::VoteReceipt;
pub use registry::Registry;
pub use weight::{integer_sqrt, vote_weight};
