//! The per-token governance registry.

use crate::params::RegistryPolicy;
use dao_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};

/// Global policy and treasury anchor for one governed token.
///
/// Lives at `registry_address(token_mint)`; its treasury vault lives at
/// `vault_address(token_mint)` and is owned by the registry address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// The registry's own derived address.
    pub address: Address,
    /// Fungible asset under governance.
    pub token_mint: Address,
    /// Custody account holding governed funds.
    pub treasury_vault: Address,
    /// Identity that initialized the registry. Carries no later privileges.
    pub authority: Address,
    pub policy: RegistryPolicy,
    pub created_at: Timestamp,
}

impl Registry {
    /// Last instant at which a proposal created at `created_at` accepts votes.
    ///
    /// Saturates at the end of time rather than wrapping.
    pub fn voting_deadline(&self, created_at: Timestamp) -> Timestamp {
        created_at
            .checked_add_secs(self.policy.proposal_duration_secs)
            .unwrap_or(Timestamp::new(u64::MAX))
    }
}
