//! Account storage trait.

use crate::StoreError;
use dao_types::Address;

/// Key-value store of independently addressed accounts.
///
/// Payloads are opaque bytes; callers own the encoding. `create_at` is an
/// insert-if-absent and is the only uniqueness guard the engine relies on.
pub trait AccountStore: Send + Sync {
    /// Whether an account exists at `address`.
    fn exists(&self, address: &Address) -> Result<bool, StoreError>;

    /// Read the account at `address`.
    fn get(&self, address: &Address) -> Result<Vec<u8>, StoreError>;

    /// Create a new account. Fails with [`StoreError::Duplicate`] if the
    /// address is already occupied; never overwrites.
    fn create_at(&self, address: &Address, data: &[u8]) -> Result<(), StoreError>;

    /// Overwrite an existing account. Fails with [`StoreError::NotFound`]
    /// if nothing lives at `address`.
    fn put(&self, address: &Address, data: &[u8]) -> Result<(), StoreError>;

    /// Delete an account. Only used to undo a creation inside a transition
    /// that failed before completing.
    fn remove(&self, address: &Address) -> Result<(), StoreError>;

    /// Number of stored accounts.
    fn account_count(&self) -> Result<u64, StoreError>;
}
