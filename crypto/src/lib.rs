//! Cryptographic primitives for the treasury DAO.
//!
//! - **Blake2b** for hashing
//! - Deterministic address derivation: every registry, vault, proposal and
//!   vote receipt lives at an address computed from its identifying seeds,
//!   which is what makes each of them unique.

pub mod address;
pub mod hash;

pub use address::{
    derive_address, proposal_address, receipt_address, registry_address, vault_address,
};
pub use hash::{blake2b_256, blake2b_256_multi};
