//! Per-delegator registry of delegations, keyed by operator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use steward_ledger::UnitOfWork;
use steward_types::AccountId;

use crate::record::DelegationRecord;
use crate::DelegationError;

/// Domain-separation tag mixed into every position seed.
pub const POSITION_SEED_TAG: &[u8] = b"steward::delegation::position";

/// All live delegations of one delegator.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DelegationRegistry {
    records: BTreeMap<AccountId, DelegationRecord>,
    /// Positions ever created by this delegator; keeps position seeds unique
    /// even when an operator key is reused.
    positions_created: u64,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, operator: &AccountId) -> Option<&DelegationRecord> {
        self.records.get(operator)
    }

    pub fn contains(&self, operator: &AccountId) -> bool {
        self.records.contains_key(operator)
    }

    /// Operators this delegator currently has a record with, in key order.
    pub fn operators(&self) -> impl Iterator<Item = &AccountId> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &DelegationRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn positions_created(&self) -> u64 {
        self.positions_created
    }

    pub fn encode(&self) -> Result<Vec<u8>, DelegationError> {
        bincode::serialize(self).map_err(|e| DelegationError::Codec(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DelegationError> {
        bincode::deserialize(bytes).map_err(|e| DelegationError::Codec(e.to_string()))
    }

    pub(crate) fn get_mut(
        &mut self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<&mut DelegationRecord, DelegationError> {
        self.records
            .get_mut(operator)
            .ok_or(DelegationError::DelegationNotFound {
                delegator: *delegator,
                operator: *operator,
            })
    }

    pub(crate) fn insert(
        &mut self,
        delegator: &AccountId,
        operator: AccountId,
        record: DelegationRecord,
    ) -> Result<(), DelegationError> {
        if self.records.contains_key(&operator) {
            return Err(DelegationError::AlreadyExists {
                delegator: *delegator,
                operator,
            });
        }
        self.records.insert(operator, record);
        Ok(())
    }

    pub(crate) fn remove(
        &mut self,
        delegator: &AccountId,
        operator: &AccountId,
    ) -> Result<DelegationRecord, DelegationError> {
        self.records
            .remove(operator)
            .ok_or(DelegationError::DelegationNotFound {
                delegator: *delegator,
                operator: *operator,
            })
    }

    /// Seed for the next position: `operator ++ POSITION_SEED_TAG ++ counter`.
    pub(crate) fn next_position_seed(&mut self, operator: &AccountId) -> Result<Vec<u8>, DelegationError> {
        let counter = self.positions_created;
        self.positions_created = counter.checked_add(1).ok_or(DelegationError::Overflow)?;

        let mut seed = Vec::with_capacity(32 + POSITION_SEED_TAG.len() + 8);
        seed.extend_from_slice(operator.as_bytes());
        seed.extend_from_slice(POSITION_SEED_TAG);
        seed.extend_from_slice(&counter.to_le_bytes());
        Ok(seed)
    }
}

/// Load a delegator's registry, if one was ever created.
pub(crate) fn load(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
) -> Result<Option<DelegationRegistry>, DelegationError> {
    match unit.registry().get_registry(delegator)? {
        Some(bytes) => Ok(Some(DelegationRegistry::decode(&bytes)?)),
        None => Ok(None),
    }
}

/// Load a registry that must already exist.
pub(crate) fn load_existing(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
) -> Result<DelegationRegistry, DelegationError> {
    load(unit, delegator)?.ok_or(DelegationError::RegistryNotFound(*delegator))
}

pub(crate) fn save(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    registry: &DelegationRegistry,
) -> Result<(), DelegationError> {
    let bytes = registry.encode()?;
    unit.registry().put_registry(delegator, &bytes)?;
    Ok(())
}
