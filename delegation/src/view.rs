//! Read-only queries over registries and positions.
//!
//! Views run inside a unit of work that is never committed, so they observe
//! exactly what a subsequent operation would see and change nothing.

use steward_ledger::UnitOfWork;
use steward_types::{AccountId, Amount};

use crate::debt::CommissionDebt;
use crate::record::DelegationRecord;
use crate::registry;
use crate::DelegationError;

/// Stake and commission figures for one delegation, as of now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelegationAmounts {
    /// Active plus pending-active stake at the position.
    pub total_active: Amount,
    /// Rewards accrued since the principal was last recorded.
    pub accumulated_rewards: Amount,
    /// Commission the current operator would be due on those rewards.
    pub commission_owed: Amount,
}

fn with_record<T>(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
    f: impl FnOnce(&DelegationRecord) -> T,
) -> Result<T, DelegationError> {
    let registry = registry::load_existing(unit, delegator)?;
    let record = registry.get(operator).ok_or(DelegationError::DelegationNotFound {
        delegator: *delegator,
        operator: *operator,
    })?;
    Ok(f(record))
}

pub(crate) fn position_address(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
) -> Result<AccountId, DelegationError> {
    with_record(unit, delegator, operator, |r| r.position_id())
}

pub(crate) fn last_recorded_principal(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
) -> Result<Amount, DelegationError> {
    with_record(unit, delegator, operator, |r| r.principal_amount())
}

pub(crate) fn commission_percentage(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
) -> Result<u8, DelegationError> {
    with_record(unit, delegator, operator, |r| r.commission_rate().percent())
}

pub(crate) fn is_active(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
) -> Result<bool, DelegationError> {
    with_record(unit, delegator, operator, |r| r.is_active())
}

pub(crate) fn delegation_amounts(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
) -> Result<DelegationAmounts, DelegationError> {
    let (position, principal, rate) = with_record(unit, delegator, operator, |r| {
        (r.position_id(), r.principal_amount(), r.commission_rate())
    })?;
    let total_active = unit.stake().get_balances(&position)?.total_active();
    let accumulated_rewards = total_active.saturating_sub(principal);
    Ok(DelegationAmounts {
        total_active,
        accumulated_rewards,
        commission_owed: rate.commission_on(accumulated_rewards),
    })
}

pub(crate) fn outstanding_debts(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    operator: &AccountId,
) -> Result<Vec<CommissionDebt>, DelegationError> {
    with_record(unit, delegator, operator, |r| r.debts().iter().cloned().collect())
}

/// Operators the delegator has a live record with. A delegator that never
/// delegated has none.
pub(crate) fn operators(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
) -> Result<Vec<AccountId>, DelegationError> {
    Ok(registry::load(unit, delegator)?
        .map(|registry| registry.operators().copied().collect())
        .unwrap_or_default())
}
