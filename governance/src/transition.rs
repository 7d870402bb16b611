//! Undo journal for a single state transition.
//!
//! Each engine operation validates everything it can up front, then applies
//! its effects one at a time. Every applied effect pushes its inverse here;
//! if a later effect fails, the journal replays the inverses newest-first so
//! the operation leaves no partial state behind.

use dao_store::{AccountStore, TokenLedger};
use dao_types::{Address, TokenAmount};

pub(crate) enum Undo {
    /// Remove an account created by `create_at`.
    RemoveAccount(Address),
    /// Close a token account opened by `open_account`.
    CloseTokenAccount(Address),
    /// Move funds back: the forward transfer went `to -> from`.
    Refund {
        from: Address,
        to: Address,
        amount: TokenAmount,
    },
}

pub(crate) struct Journal<'a> {
    store: &'a dyn AccountStore,
    tokens: &'a dyn TokenLedger,
    undo: Vec<Undo>,
}

impl<'a> Journal<'a> {
    pub(crate) fn new(store: &'a dyn AccountStore, tokens: &'a dyn TokenLedger) -> Self {
        Self {
            store,
            tokens,
            undo: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, undo: Undo) {
        self.undo.push(undo);
    }

    /// The transition completed; forget the inverses.
    pub(crate) fn commit(mut self) {
        self.undo.clear();
    }

    /// Replay inverses newest-first. Failures here are logged, not returned:
    /// the caller is already propagating the error that triggered rollback.
    pub(crate) fn rollback(mut self) {
        while let Some(step) = self.undo.pop() {
            let result = match &step {
                Undo::RemoveAccount(address) => {
                    self.store.remove(address).map_err(|e| e.to_string())
                }
                Undo::CloseTokenAccount(address) => {
                    self.tokens.close_account(address).map_err(|e| e.to_string())
                }
                Undo::Refund { from, to, amount } => self
                    .tokens
                    .transfer(from, to, *amount)
                    .map_err(|e| e.to_string()),
            };
            if let Err(e) = result {
                tracing::error!(error = %e, "rollback step failed; ledger may be inconsistent");
            }
        }
    }
}
