//! Delegation registry storage traits.
//!
//! One entry per delegator. Values are opaque bytes so this crate does not
//! depend on `steward-delegation` (which would create a circular dependency);
//! the delegation engine serializes its own registry type.

use crate::StoreError;
use steward_types::AccountId;

/// Read-modify-write access to per-delegator registries inside one batch.
///
/// There is no delete: an emptied registry still carries the delegator's
/// position counter and must outlive its last delegation.
pub trait RegistryStore {
    fn get_registry(&self, delegator: &AccountId) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_registry(&mut self, delegator: &AccountId, bytes: &[u8]) -> Result<(), StoreError>;
}

/// A group of registry writes that becomes visible all at once.
///
/// Dropping a batch without calling [`RegistryBatch::commit`] discards every
/// write made through it.
pub trait RegistryBatch: RegistryStore {
    fn commit(self) -> Result<(), StoreError>;
}

/// A registry backend that hands out write batches.
pub trait RegistryBackend {
    type Batch<'a>: RegistryBatch
    where
        Self: 'a;

    fn begin_batch(&self) -> Result<Self::Batch<'_>, StoreError>;
}
