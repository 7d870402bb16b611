//! Fundamental types for the treasury DAO.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, token amounts, timestamps and the clock abstraction, vote choices.

pub mod address;
pub mod amount;
pub mod time;
pub mod vote;

pub use address::Address;
pub use amount::{TokenAmount, VoteWeight};
pub use time::{Clock, SystemClock, Timestamp};
pub use vote::VoteChoice;
