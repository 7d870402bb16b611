//! Nullable token ledger with in-memory balances.

use dao_store::{TokenAccount, TokenError, TokenLedger};
use dao_types::{Address, TokenAmount};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory fungible-token ledger.
///
/// All accounts live behind one lock, so `transfer` is trivially atomic.
pub struct NullTokenLedger {
    accounts: Mutex<HashMap<Address, TokenAccount>>,
}

impl NullTokenLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Credit `amount` to an existing account out of thin air.
    pub fn mint_to(&self, address: &Address, amount: TokenAmount) -> Result<(), TokenError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(address)
            .ok_or(TokenError::AccountNotFound(*address))?;
        account.amount = account
            .amount
            .checked_add(amount)
            .ok_or(TokenError::Overflow(*address))?;
        Ok(())
    }

    /// Open an account and fund it in one step.
    pub fn open_funded(
        &self,
        address: &Address,
        mint: &Address,
        owner: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        self.open_account(address, mint, owner)?;
        self.mint_to(address, amount)
    }

    /// Sum of all balances held for `mint`.
    pub fn supply(&self, mint: &Address) -> u128 {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.mint == *mint)
            .map(|a| a.amount.raw() as u128)
            .sum()
    }
}

impl Default for NullTokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenLedger for NullTokenLedger {
    fn open_account(
        &self,
        address: &Address,
        mint: &Address,
        owner: &Address,
    ) -> Result<(), TokenError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(address) {
            return Err(TokenError::AccountExists(*address));
        }
        accounts.insert(
            *address,
            TokenAccount {
                address: *address,
                mint: *mint,
                owner: *owner,
                amount: TokenAmount::ZERO,
            },
        );
        Ok(())
    }

    fn account(&self, address: &Address) -> Result<TokenAccount, TokenError> {
        self.accounts
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or(TokenError::AccountNotFound(*address))
    }

    fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        let mut accounts = self.accounts.lock().unwrap();
        let source = accounts
            .get(from)
            .ok_or(TokenError::AccountNotFound(*from))?;
        let dest = accounts.get(to).ok_or(TokenError::AccountNotFound(*to))?;
        if source.mint != dest.mint {
            return Err(TokenError::MintMismatch {
                from: *from,
                from_mint: source.mint,
                to: *to,
                to_mint: dest.mint,
            });
        }
        if from == to {
            return if source.amount >= amount {
                Ok(())
            } else {
                Err(TokenError::InsufficientFunds {
                    account: *from,
                    needed: amount,
                    available: source.amount,
                })
            };
        }
        let new_source = source
            .amount
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientFunds {
                account: *from,
                needed: amount,
                available: source.amount,
            })?;
        let new_dest = dest
            .amount
            .checked_add(amount)
            .ok_or(TokenError::Overflow(*to))?;

        // Both checks passed; apply the two writes under the same lock.
        if let Some(a) = accounts.get_mut(from) {
            a.amount = new_source;
        }
        if let Some(a) = accounts.get_mut(to) {
            a.amount = new_dest;
        }
        Ok(())
    }

    fn close_account(&self, address: &Address) -> Result<(), TokenError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(address)
            .ok_or(TokenError::AccountNotFound(*address))?;
        if !account.amount.is_zero() {
            return Err(TokenError::Backend(format!(
                "cannot close {address}: balance {} is not zero",
                account.amount
            )));
        }
        accounts.remove(address);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mint() -> Address {
        Address::repeat(0xee)
    }

    fn ledger_with(balances: &[(u8, u64)]) -> NullTokenLedger {
        let ledger = NullTokenLedger::new();
        for &(id, amount) in balances {
            let addr = Address::repeat(id);
            ledger
                .open_funded(&addr, &mint(), &addr, TokenAmount::new(amount))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_transfer_moves_funds() {
        let ledger = ledger_with(&[(1, 100), (2, 0)]);
        ledger
            .transfer(&Address::repeat(1), &Address::repeat(2), TokenAmount::new(40))
            .unwrap();
        assert_eq!(ledger.balance_of(&Address::repeat(1)).unwrap().raw(), 60);
        assert_eq!(ledger.balance_of(&Address::repeat(2)).unwrap().raw(), 40);
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let ledger = ledger_with(&[(1, 10), (2, 5)]);
        let err = ledger
            .transfer(&Address::repeat(1), &Address::repeat(2), TokenAmount::new(11))
            .unwrap_err();
        match err {
            TokenError::InsufficientFunds { needed, available, .. } => {
                assert_eq!(needed.raw(), 11);
                assert_eq!(available.raw(), 10);
            }
            other => panic!("Expected InsufficientFunds, got {other:?}"),
        }
        assert_eq!(ledger.balance_of(&Address::repeat(1)).unwrap().raw(), 10);
        assert_eq!(ledger.balance_of(&Address::repeat(2)).unwrap().raw(), 5);
    }

    #[test]
    fn test_mint_mismatch_rejected() {
        let ledger = ledger_with(&[(1, 10)]);
        let other = Address::repeat(3);
        ledger
            .open_account(&other, &Address::repeat(0xdd), &other)
            .unwrap();
        assert!(matches!(
            ledger.transfer(&Address::repeat(1), &other, TokenAmount::new(1)),
            Err(TokenError::MintMismatch { .. })
        ));
    }

    #[test]
    fn test_open_twice_fails() {
        let ledger = ledger_with(&[(1, 0)]);
        let addr = Address::repeat(1);
        assert!(matches!(
            ledger.open_account(&addr, &mint(), &addr),
            Err(TokenError::AccountExists(_))
        ));
    }

    #[test]
    fn test_close_requires_zero_balance() {
        let ledger = ledger_with(&[(1, 5), (2, 0)]);
        assert!(ledger.close_account(&Address::repeat(1)).is_err());
        ledger.close_account(&Address::repeat(2)).unwrap();
        assert!(ledger.account(&Address::repeat(2)).is_err());
    }

    #[test]
    fn test_supply_sums_balances() {
        let ledger = ledger_with(&[(1, 5), (2, 7)]);
        assert_eq!(ledger.supply(&mint()), 12);
    }
}
