//! A local execution substrate composing a registry backend with the
//! nullable ledgers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use steward_ledger::{
    AssetLedger, HashDeriver, LedgerError, StakeLedger, SubAccountDeriver, Substrate, UnitOfWork,
};
use steward_store::{RegistryBackend, RegistryBatch, RegistryStore};

use crate::ledgers::NullLedgers;
use crate::registry::NullRegistryBackend;

/// Runs one unit of work at a time against a registry backend and an
/// in-memory ledger pair.
///
/// A unit holds the ledger lock for its whole lifetime, so operations are
/// serialized. Ledger mutations are staged on a copy and swapped in on commit,
/// after the registry batch has committed.
pub struct LocalSubstrate<B: RegistryBackend = NullRegistryBackend> {
    backend: B,
    ledgers: Mutex<NullLedgers>,
    deriver: HashDeriver,
}

impl LocalSubstrate<NullRegistryBackend> {
    pub fn new() -> Self {
        Self::with_backend(NullRegistryBackend::new())
    }
}

impl Default for LocalSubstrate<NullRegistryBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RegistryBackend> LocalSubstrate<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            ledgers: Mutex::new(NullLedgers::new()),
            deriver: HashDeriver,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Inspect or drive the committed ledgers directly (fund accounts,
    /// advance epochs, pay rewards). Must not be called while a unit is open.
    pub fn with_ledgers<T>(&self, f: impl FnOnce(&mut NullLedgers) -> T) -> T {
        f(&mut self.lock_ledgers())
    }

    fn lock_ledgers(&self) -> MutexGuard<'_, NullLedgers> {
        self.ledgers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One staged operation against a [`LocalSubstrate`].
pub struct LocalUnit<'a, B: RegistryBackend + 'a> {
    batch: B::Batch<'a>,
    working: NullLedgers,
    committed: MutexGuard<'a, NullLedgers>,
    deriver: &'a HashDeriver,
}

impl<'a, B: RegistryBackend + 'a> UnitOfWork for LocalUnit<'a, B> {
    fn registry(&mut self) -> &mut dyn RegistryStore {
        &mut self.batch
    }

    fn stake(&mut self) -> &mut dyn StakeLedger {
        &mut self.working
    }

    fn assets(&mut self) -> &mut dyn AssetLedger {
        &mut self.working
    }

    fn deriver(&self) -> &dyn SubAccountDeriver {
        self.deriver
    }

    fn commit(self) -> Result<(), LedgerError> {
        let LocalUnit {
            batch,
            working,
            mut committed,
            ..
        } = self;
        batch.commit()?;
        *committed = working;
        Ok(())
    }
}

impl<B: RegistryBackend> Substrate for LocalSubstrate<B> {
    type Unit<'a> = LocalUnit<'a, B>
    where
        Self: 'a;

    fn begin(&self) -> Result<LocalUnit<'_, B>, LedgerError> {
        let committed = self.lock_ledgers();
        let batch = self.backend.begin_batch()?;
        Ok(LocalUnit {
            batch,
            working: committed.clone(),
            committed,
            deriver: &self.deriver,
        })
    }
}
