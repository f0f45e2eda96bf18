//! Nullable registry backend: thread-safe in-memory storage with staged batches.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use steward_store::{RegistryBackend, RegistryBatch, RegistryStore, StoreError};
use steward_types::AccountId;

/// In-memory registry store. Writes become visible only when a batch commits.
pub struct NullRegistryBackend {
    registries: Mutex<BTreeMap<AccountId, Vec<u8>>>,
}

impl NullRegistryBackend {
    pub fn new() -> Self {
        Self {
            registries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Committed bytes for `delegator`, bypassing any batch.
    pub fn committed(&self, delegator: &AccountId) -> Option<Vec<u8>> {
        self.lock().get(delegator).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<AccountId, Vec<u8>>> {
        self.registries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NullRegistryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes staged on top of the committed map.
pub struct NullRegistryBatch<'a> {
    backend: &'a NullRegistryBackend,
    staged: BTreeMap<AccountId, Vec<u8>>,
}

impl RegistryStore for NullRegistryBatch<'_> {
    fn get_registry(&self, delegator: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        match self.staged.get(delegator) {
            Some(staged) => Ok(Some(staged.clone())),
            None => Ok(self.backend.committed(delegator)),
        }
    }

    fn put_registry(&mut self, delegator: &AccountId, bytes: &[u8]) -> Result<(), StoreError> {
        self.staged.insert(*delegator, bytes.to_vec());
        Ok(())
    }
}

impl RegistryBatch for NullRegistryBatch<'_> {
    fn commit(self) -> Result<(), StoreError> {
        self.backend.lock().extend(self.staged);
        Ok(())
    }
}

impl RegistryBackend for NullRegistryBackend {
    type Batch<'a> = NullRegistryBatch<'a>
    where
        Self: 'a;

    fn begin_batch(&self) -> Result<NullRegistryBatch<'_>, StoreError> {
        Ok(NullRegistryBatch {
            backend: self,
            staged: BTreeMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    #[test]
    fn writes_are_invisible_until_commit() {
        let backend = NullRegistryBackend::new();
        let mut batch = backend.begin_batch().unwrap();
        batch.put_registry(&account(1), b"abc").unwrap();

        assert_eq!(batch.get_registry(&account(1)).unwrap(), Some(b"abc".to_vec()));
        assert!(backend.committed(&account(1)).is_none());

        batch.commit().unwrap();
        assert_eq!(backend.committed(&account(1)), Some(b"abc".to_vec()));
    }

    #[test]
    fn dropped_batch_discards_writes() {
        let backend = NullRegistryBackend::new();
        {
            let mut batch = backend.begin_batch().unwrap();
            batch.put_registry(&account(1), b"abc").unwrap();
        }
        assert!(backend.is_empty());
    }

    #[test]
    fn staged_write_shadows_committed_bytes() {
        let backend = NullRegistryBackend::new();
        let mut seed = backend.begin_batch().unwrap();
        seed.put_registry(&account(1), b"old").unwrap();
        seed.commit().unwrap();

        let mut batch = backend.begin_batch().unwrap();
        batch.put_registry(&account(1), b"new").unwrap();
        assert_eq!(batch.get_registry(&account(1)).unwrap(), Some(b"new".to_vec()));
        assert_eq!(backend.committed(&account(1)), Some(b"old".to_vec()));

        batch.commit().unwrap();
        assert_eq!(backend.committed(&account(1)), Some(b"new".to_vec()));
        assert_eq!(backend.len(), 1);
    }
}
