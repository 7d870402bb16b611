//! Fungible-token ledger trait.

use dao_types::{Address, TokenAmount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A token account: a balance of one mint, owned by one identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub address: Address,
    pub mint: Address,
    pub owner: Address,
    pub amount: TokenAmount,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token account {0} not found")]
    AccountNotFound(Address),

    #[error("token account {0} already exists")]
    AccountExists(Address),

    #[error("insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: Address,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("mint mismatch: {from} holds {from_mint}, {to} holds {to_mint}")]
    MintMismatch {
        from: Address,
        from_mint: Address,
        to: Address,
        to_mint: Address,
    },

    #[error("balance overflow in {0}")]
    Overflow(Address),

    #[error("token ledger backend error: {0}")]
    Backend(String),
}

/// The fungible-token collaborator.
///
/// `transfer` must be atomic: either both balances change or neither does.
pub trait TokenLedger: Send + Sync {
    /// Open an empty token account for `mint` owned by `owner`.
    fn open_account(
        &self,
        address: &Address,
        mint: &Address,
        owner: &Address,
    ) -> Result<(), TokenError>;

    /// Read a token account.
    fn account(&self, address: &Address) -> Result<TokenAccount, TokenError>;

    /// Current balance of a token account.
    fn balance_of(&self, address: &Address) -> Result<TokenAmount, TokenError> {
        self.account(address).map(|a| a.amount)
    }

    /// Move `amount` from `from` to `to`. Both accounts must hold the same mint.
    fn transfer(&self, from: &Address, to: &Address, amount: TokenAmount)
        -> Result<(), TokenError>;

    /// Close an account that holds a zero balance. Only used to undo an
    /// account opened inside a transition that failed before completing.
    fn close_account(&self, address: &Address) -> Result<(), TokenError>;
}
