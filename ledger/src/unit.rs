//! Atomic units of work.

use steward_store::RegistryStore;

use crate::{AssetLedger, LedgerError, StakeLedger, SubAccountDeriver};

/// Everything one public operation may touch, staged until [`UnitOfWork::commit`].
///
/// Dropping a unit without committing discards all of its effects: registry
/// writes, stake-ledger mutations and asset transfers alike.
pub trait UnitOfWork {
    fn registry(&mut self) -> &mut dyn RegistryStore;
    fn stake(&mut self) -> &mut dyn StakeLedger;
    fn assets(&mut self) -> &mut dyn AssetLedger;
    fn deriver(&self) -> &dyn SubAccountDeriver;

    fn commit(self) -> Result<(), LedgerError>
    where
        Self: Sized;
}

/// The execution substrate that serializes operations and hands out units.
pub trait Substrate {
    type Unit<'a>: UnitOfWork
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Unit<'_>, LedgerError>;
}
