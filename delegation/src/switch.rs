//! Moving a live position from one operator to another.

use steward_ledger::UnitOfWork;
use steward_types::{AccountId, Amount};

use crate::accounting::update_principal;
use crate::event::DelegationEvent;
use crate::registry;
use crate::DelegationError;

/// Reassign the position under `old_operator` to `new_operator`.
///
/// The old operator is owed the requested commission that is still unlocking
/// and not yet owed to an earlier operator, plus commission at the old rate on
/// rewards observed now. That amount joins the back of the record's debt
/// queue. Stake unlocked by anyone else is never counted. Returns the debt
/// recorded.
pub(crate) fn switch_operator(
    unit: &mut dyn UnitOfWork,
    delegator: &AccountId,
    old_operator: &AccountId,
    new_operator: &AccountId,
    events: &mut Vec<DelegationEvent>,
) -> Result<Amount, DelegationError> {
    let mut registry = registry::load_existing(unit, delegator)?;

    let is_active = registry
        .get(old_operator)
        .map(|r| r.is_active())
        .ok_or(DelegationError::DelegationNotFound {
            delegator: *delegator,
            operator: *old_operator,
        })?;
    if !is_active {
        return Err(DelegationError::InvalidState(
            "cannot switch the operator of an ended delegation".to_string(),
        ));
    }
    if registry.contains(new_operator) {
        return Err(DelegationError::AlreadyExists {
            delegator: *delegator,
            operator: *new_operator,
        });
    }

    let mut record = registry.remove(delegator, old_operator)?;

    let accrued = update_principal(unit.stake(), &mut record)?;
    let uncovered = record
        .commission_unlocking
        .saturating_sub(record.commission_in_debt);
    let debt = uncovered
        .checked_add(record.commission_rate.commission_on(accrued))
        .ok_or(DelegationError::Overflow)?;
    // Unlocking commission stays withdrawable; once withdrawn it settles this
    // debt before the new operator sees any of it.
    record.debts.push_back(*old_operator, debt);
    record.commission_in_debt = record.commission_unlocking;

    unit.stake().set_operator(&record.owner_cap, new_operator)?;
    registry.insert(delegator, *new_operator, record)?;
    registry::save(unit, delegator, &registry)?;

    tracing::info!(%delegator, %old_operator, %new_operator, debt = %debt, "operator switched");
    events.push(DelegationEvent::OperatorSwitched {
        delegator: *delegator,
        old_operator: *old_operator,
        new_operator: *new_operator,
        debt_recorded: debt,
    });
    Ok(debt)
}
