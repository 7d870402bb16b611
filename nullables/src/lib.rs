//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators (clock, account store, token ledger) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! The CLI's scenario runner uses them as its ledger as well.

pub mod clock;
pub mod store;
pub mod token;

pub use clock::NullClock;
pub use store::NullStore;
pub use token::NullTokenLedger;
