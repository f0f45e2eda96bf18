//! LMDB implementation of the registry store.
//!
//! Key format: the delegator's 32 raw bytes. Value: the registry exactly as
//! encoded by the delegation engine.

use heed::RwTxn;

use steward_store::{RegistryBackend, RegistryBatch, RegistryStore, StoreError};
use steward_types::AccountId;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

/// A write batch that groups every registry write of one operation into a
/// single LMDB write transaction.
///
/// If the batch is dropped without calling [`RegistryBatch::commit`], all
/// writes are rolled back (the underlying LMDB transaction is aborted).
pub struct RegistryWriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> RegistryWriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }
}

impl RegistryStore for RegistryWriteBatch<'_> {
    fn get_registry(&self, delegator: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .env
            .registries_db
            .get(&self.txn, delegator.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn put_registry(&mut self, delegator: &AccountId, bytes: &[u8]) -> Result<(), StoreError> {
        self.env
            .registries_db
            .put(&mut self.txn, delegator.as_bytes(), bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }
}

impl RegistryBatch for RegistryWriteBatch<'_> {
    fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

impl RegistryBackend for LmdbEnvironment {
    type Batch<'a> = RegistryWriteBatch<'a>
    where
        Self: 'a;

    fn begin_batch(&self) -> Result<RegistryWriteBatch<'_>, StoreError> {
        RegistryWriteBatch::new(self)
    }
}

fn collect_delegators(
    env: &LmdbEnvironment,
    txn: &heed::RoTxn<'_>,
) -> Result<Vec<AccountId>, StoreError> {
    let iter = env.registries_db.iter(txn).map_err(LmdbError::from)?;
    let mut results = Vec::new();
    for item in iter {
        let (key, _) = item.map_err(LmdbError::from)?;
        let id = AccountId::from_slice(key)
            .map_err(|e| StoreError::Corruption(format!("registry key: {e}")))?;
        results.push(id);
    }
    Ok(results)
}

// ── Read-only access (inspection tooling) ───────────────────────────────

impl LmdbEnvironment {
    /// Read one registry outside of any write batch.
    pub fn read_registry(&self, delegator: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let value = self
            .registries_db
            .get(&rtxn, delegator.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    /// List every delegator with a stored registry.
    pub fn read_delegators(&self) -> Result<Vec<AccountId>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        collect_delegators(self, &rtxn)
    }
}
