//! One delegation: a delegator's stake position under one operator.

use serde::{Deserialize, Serialize};
use steward_types::{AccountId, Amount, CommissionRate, OwnerCapability};

use crate::debt::DebtQueue;

/// Accounting state of one (delegator, operator) delegation.
///
/// The record owns the position's [`OwnerCapability`]; the capability lives
/// exactly as long as the record and is consumed when the record is wound down.
#[derive(Debug, Serialize, Deserialize)]
pub struct DelegationRecord {
    /// Stake treated as principal, re-baselined on every reward observation.
    pub(crate) principal_amount: Amount,
    pub(crate) owner_cap: OwnerCapability,
    pub(crate) commission_rate: CommissionRate,
    pub(crate) is_active: bool,
    pub(crate) debts: DebtQueue,
    /// Commission unlocked through `request_commission` and not yet withdrawn.
    /// Bounds what `withdraw_commission` may pay out.
    pub(crate) commission_unlocking: Amount,
    /// Part of `commission_unlocking` already owed to a former operator
    /// through a recorded debt. Never exceeds `commission_unlocking`.
    pub(crate) commission_in_debt: Amount,
}

impl DelegationRecord {
    pub(crate) fn new(
        principal_amount: Amount,
        owner_cap: OwnerCapability,
        commission_rate: CommissionRate,
    ) -> Self {
        Self {
            principal_amount,
            owner_cap,
            commission_rate,
            is_active: true,
            debts: DebtQueue::new(),
            commission_unlocking: Amount::ZERO,
            commission_in_debt: Amount::ZERO,
        }
    }

    pub fn principal_amount(&self) -> Amount {
        self.principal_amount
    }

    pub fn position_id(&self) -> AccountId {
        self.owner_cap.position()
    }

    pub fn commission_rate(&self) -> CommissionRate {
        self.commission_rate
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn debts(&self) -> &DebtQueue {
        &self.debts
    }

    pub fn commission_unlocking(&self) -> Amount {
        self.commission_unlocking
    }

    pub fn commission_in_debt(&self) -> Amount {
        self.commission_in_debt
    }
}
