//! The staking protocol that owns positions and their lock-up state.

use serde::{Deserialize, Serialize};
use steward_types::{AccountId, Amount, Funds, OwnerCapability, SubAccountSigner};

use crate::LedgerError;

/// Balances of one stake position, split by lock-up state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeBalances {
    /// Earning rewards.
    pub active: Amount,
    /// Fully unlocked and withdrawable.
    pub inactive: Amount,
    /// Becomes active at the next lock-up cycle.
    pub pending_active: Amount,
    /// Unlocking; becomes inactive at the next lock-up cycle.
    pub pending_inactive: Amount,
}

impl StakeBalances {
    /// Stake that belongs to the position's earning base: `active + pending_active`.
    pub fn total_active(&self) -> Amount {
        self.active.saturating_add(self.pending_active)
    }

    /// Stake on its way out or already out: `inactive + pending_inactive`.
    pub fn total_unlocking(&self) -> Amount {
        self.inactive.saturating_add(self.pending_inactive)
    }
}

/// Query/mutation contract of the stake ledger.
///
/// Every mutation of a position goes through its [`OwnerCapability`]; only
/// [`StakeLedger::destroy_capability`] takes it by value.
pub trait StakeLedger {
    /// Initialise a position at the signer's address, staking `funds` with the
    /// given operator and voter, and mint its capability.
    fn create_position(
        &mut self,
        signer: SubAccountSigner,
        funds: Funds,
        operator: &AccountId,
        voter: &AccountId,
    ) -> Result<OwnerCapability, LedgerError>;

    fn get_balances(&self, position: &AccountId) -> Result<StakeBalances, LedgerError>;

    /// Move `amount` from active to pending-inactive.
    fn begin_unlock(&mut self, cap: &OwnerCapability, amount: Amount) -> Result<(), LedgerError>;

    /// Take `amount` out of the inactive bucket.
    fn withdraw(&mut self, cap: &OwnerCapability, amount: Amount) -> Result<Funds, LedgerError>;

    fn set_operator(&mut self, cap: &OwnerCapability, operator: &AccountId) -> Result<(), LedgerError>;

    fn set_voter(&mut self, cap: &OwnerCapability, voter: &AccountId) -> Result<(), LedgerError>;

    /// Ask for the position to leave the validator set.
    fn exit_validator_duty(&mut self, position: &AccountId) -> Result<(), LedgerError>;

    fn destroy_capability(&mut self, cap: OwnerCapability) -> Result<(), LedgerError>;
}
