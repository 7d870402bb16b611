//! Nullable store: thread-safe in-memory account storage.

use dao_store::{AccountStore, StoreError};
use dao_types::Address;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory account store for testing.
pub struct NullStore {
    accounts: Mutex<HashMap<Address, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for NullStore {
    fn exists(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self.accounts.lock().unwrap().contains_key(address))
    }

    fn get(&self, address: &Address) -> Result<Vec<u8>, StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(address.to_string()))
    }

    fn create_at(&self, address: &Address, data: &[u8]) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(address) {
            return Err(StoreError::Duplicate(address.to_string()));
        }
        accounts.insert(*address, data.to_vec());
        Ok(())
    }

    fn put(&self, address: &Address, data: &[u8]) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(address) {
            Some(slot) => {
                *slot = data.to_vec();
                Ok(())
            }
            None => Err(StoreError::NotFound(address.to_string())),
        }
    }

    fn remove(&self, address: &Address) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .remove(address)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(address.to_string()))
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }
}
