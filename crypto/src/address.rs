//! Deterministic address derivation.
//!
//! `address = Blake2b-256(DOMAIN || tag || len(seed_0) || seed_0 || ...)`
//!
//! Seeds are length-prefixed (u32 LE) so that `("ab", "c")` and `("a", "bc")`
//! hash differently. The per-entity tags mirror the entity kinds:
//!
//! | entity   | tag        | seeds                               |
//! |----------|------------|-------------------------------------|
//! | registry | `registry` | token mint                          |
//! | vault    | `vault`    | token mint                          |
//! | proposal | `proposal` | registry, proposer, index (u64 LE)  |
//! | receipt  | `vote`     | proposal, voter                     |

use crate::hash::blake2b_256_multi;
use dao_types::Address;

/// Namespace mixed into every derivation so addresses never coincide with
/// hashes produced elsewhere.
const DOMAIN: &[u8] = b"treasury-dao/v1";

/// Derive an address from a tag and an ordered list of seeds.
pub fn derive_address(tag: &[u8], seeds: &[&[u8]]) -> Address {
    let tag_len = (tag.len() as u32).to_le_bytes();
    let lens: Vec<[u8; 4]> = seeds
        .iter()
        .map(|s| (s.len() as u32).to_le_bytes())
        .collect();

    let mut parts: Vec<&[u8]> = Vec::with_capacity(3 + seeds.len() * 2);
    parts.push(DOMAIN);
    parts.push(&tag_len);
    parts.push(tag);
    for (seed, len) in seeds.iter().zip(lens.iter()) {
        parts.push(len);
        parts.push(seed);
    }
    Address::new(blake2b_256_multi(&parts))
}

pub fn registry_address(token_mint: &Address) -> Address {
    derive_address(b"registry", &[token_mint.as_bytes()])
}

pub fn vault_address(token_mint: &Address) -> Address {
    derive_address(b"vault", &[token_mint.as_bytes()])
}

pub fn proposal_address(registry: &Address, proposer: &Address, index: u64) -> Address {
    derive_address(
        b"proposal",
        &[registry.as_bytes(), proposer.as_bytes(), &index.to_le_bytes()],
    )
}

pub fn receipt_address(proposal: &Address, voter: &Address) -> Address {
    derive_address(b"vote", &[proposal.as_bytes(), voter.as_bytes()])
}
