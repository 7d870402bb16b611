//! Quadratic vote weight.
//!
//! A vote counts with `floor(sqrt(balance))`. Doubling a balance raises its
//! influence by about √2. The root is computed in integers only: downstream
//! quorum and threshold checks are exact comparisons, and a float root
//! truncated to an integer drifts by one near large perfect squares.

use dao_types::{TokenAmount, VoteWeight};

/// Returns `floor(sqrt(n))` for every `u64`, i.e. the `r` with
/// `r² ≤ n < (r+1)²`.
///
/// Newton's iteration `x ← (x + n/x) / 2`, started from a power of two that
/// is guaranteed to overestimate the root. From above, the sequence
/// decreases strictly until it reaches the floor root, then stops.
pub fn integer_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }

    // sqrt(n) < 2^(floor(log2(n)) / 2 + 1)
    let shift = (63 - n.leading_zeros()) / 2 + 1;
    let mut x = 1u64 << shift;

    loop {
        let next = (x + n / x) / 2;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Weight of a vote cast by a holder of `balance`.
pub fn vote_weight(balance: TokenAmount) -> VoteWeight {
    integer_sqrt(balance.raw())
}
