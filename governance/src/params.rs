//! Registry policy: the governable numbers fixed at registry creation.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};

/// Upper bound on a proposal description, in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Voting policy applied to every proposal under one registry.
///
/// Loadable from TOML:
///
/// ```toml
/// quorum = 100000
/// proposal_duration_secs = 5
/// min_voting_threshold = 180000
/// proposal_creation_threshold = 2000000000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryPolicy {
    /// Minimum combined yes + no weight for a proposal to be actionable.
    pub quorum: u64,
    /// Length of the voting window, in seconds, from proposal creation.
    pub proposal_duration_secs: u64,
    /// Minimum yes weight for a proposal to pass.
    pub min_voting_threshold: u64,
    /// Minimum raw token balance needed to open a proposal.
    #[serde(default)]
    pub proposal_creation_threshold: u64,
}

impl RegistryPolicy {
    /// Reject policies under which no proposal could ever be decided.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.proposal_duration_secs == 0 {
            return Err(GovernanceError::InvalidPolicy(
                "proposal duration must be non-zero".into(),
            ));
        }
        if self.quorum == 0 {
            return Err(GovernanceError::InvalidPolicy(
                "quorum must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a policy from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let policy: Self =
            toml::from_str(s).map_err(|e| GovernanceError::InvalidPolicy(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RegistryPolicy {
        RegistryPolicy {
            quorum: 100_000,
            proposal_duration_secs: 5,
            min_voting_threshold: 180_000,
            proposal_creation_threshold: 2_000_000_000,
        }
    }

    #[test]
    fn valid_policy_passes() {
        assert!(policy().validate().is_ok());
    }

    #[test]
    fn zero_duration_rejected() {
        let p = RegistryPolicy {
            proposal_duration_secs: 0,
            ..policy()
        };
        assert!(matches!(p.validate(), Err(GovernanceError::InvalidPolicy(_))));
    }

    #[test]
    fn zero_quorum_rejected() {
        let p = RegistryPolicy {
            quorum: 0,
            ..policy()
        };
        assert!(matches!(p.validate(), Err(GovernanceError::InvalidPolicy(_))));
    }

    #[test]
    fn parses_from_toml() {
        let p = RegistryPolicy::from_toml_str(
            r#"
            quorum = 100000
            proposal_duration_secs = 5
            min_voting_threshold = 180000
            proposal_creation_threshold = 2000000000
            "#,
        )
        .unwrap();
        assert_eq!(p, policy());
    }

    #[test]
    fn creation_threshold_defaults_to_zero() {
        let p = RegistryPolicy::from_toml_str(
            "quorum = 1\nproposal_duration_secs = 60\nmin_voting_threshold = 1\n",
        )
        .unwrap();
        assert_eq!(p.proposal_creation_threshold, 0);
    }

    #[test]
    fn toml_with_zero_duration_rejected() {
        let err = RegistryPolicy::from_toml_str(
            "quorum = 1\nproposal_duration_secs = 0\nmin_voting_threshold = 1\n",
        )
        .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidPolicy(_)));
    }
}
