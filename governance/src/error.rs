use dao_store::{StoreError, TokenError};
use dao_types::{Address, Timestamp, TokenAmount};
use std::fmt;
use thiserror::Error;

/// Kind of entity an address refers to, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Registry,
    TreasuryVault,
    Proposal,
    VoteReceipt,
    TokenAccount,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Registry => "registry",
            Self::TreasuryVault => "treasury vault",
            Self::Proposal => "proposal",
            Self::VoteReceipt => "vote receipt",
            Self::TokenAccount => "token account",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("{kind} already exists at {address}")]
    AlreadyExists { kind: EntityKind, address: Address },

    #[error("{kind} not found at {address}")]
    NotFound { kind: EntityKind, address: Address },

    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: Address,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("voting window closed at {deadline}")]
    VotingClosed { deadline: Timestamp },

    #[error("voting window is open until {deadline}")]
    VotingStillOpen { deadline: Timestamp },

    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(Address),

    #[error("quorum not met: {have} < {need}")]
    QuorumNotMet { have: u128, need: u64 },

    #[error("{caller} does not own token account {account}")]
    Unauthorized { account: Address, caller: Address },

    #[error("recipient {got} does not match proposal target {expected}")]
    InvalidRecipient { expected: Address, got: Address },

    #[error("vault {got} is not the registry treasury {expected}")]
    InvalidVault { expected: Address, got: Address },

    #[error("token account {account} holds mint {got}, expected {expected}")]
    WrongMint {
        account: Address,
        expected: Address,
        got: Address,
    },

    #[error("invalid registry policy: {0}")]
    InvalidPolicy(String),

    #[error("description is {len} bytes, limit is {max}")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("arithmetic overflow in vote tally")]
    Overflow,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("token ledger error: {0}")]
    Token(TokenError),

    #[error("record codec error: {0}")]
    Codec(String),
}

impl From<TokenError> for GovernanceError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InsufficientFunds {
                account,
                needed,
                available,
            } => Self::InsufficientBalance {
                account,
                needed,
                available,
            },
            TokenError::AccountNotFound(address) => Self::NotFound {
                kind: EntityKind::TokenAccount,
                address,
            },
            other => Self::Token(other),
        }
    }
}
