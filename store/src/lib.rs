//! Abstract collaborator interfaces for the treasury DAO.
//!
//! The governance engine does not own a ledger. It consumes an addressable
//! account store and a fungible-token ledger through these traits; every
//! backend (in-memory for testing, or a real ledger adapter) implements them
//! and the rest of the codebase depends only on the traits.

pub mod account;
pub mod error;
pub mod token;

pub use account::AccountStore;
pub use error::StoreError;
pub use token::{TokenAccount, TokenError, TokenLedger};
