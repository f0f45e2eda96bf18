//! Nullable stake and asset ledgers: an in-memory staking protocol with an
//! explicit lock-up clock.
//!
//! New stake lands in `pending_active`; unlocks land in `pending_inactive`.
//! Nothing moves between buckets until the test calls [`NullLedgers::end_epoch`].
//! Rewards are only paid to positions that are still in the validator set.

use std::collections::BTreeMap;

use steward_ledger::{AssetLedger, LedgerError, StakeBalances, StakeLedger};
use steward_types::{AccountId, Amount, Funds, OwnerCapability, SubAccountSigner};

#[derive(Clone, Debug)]
struct NullPosition {
    operator: AccountId,
    voter: AccountId,
    balances: StakeBalances,
    in_validator_set: bool,
    cap_destroyed: bool,
}

/// Both collaborator ledgers in one cloneable value, so a unit of work can
/// stage against a copy and swap it in on commit.
#[derive(Clone, Debug, Default)]
pub struct NullLedgers {
    positions: BTreeMap<AccountId, NullPosition>,
    balances: BTreeMap<AccountId, Amount>,
    epoch: u64,
}

impl NullLedgers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint liquid balance out of thin air.
    pub fn fund(&mut self, account: &AccountId, amount: Amount) {
        let balance = self.balances.entry(*account).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Bucket balances of a position; all zero for an unknown position.
    pub fn balances_of(&self, position: &AccountId) -> StakeBalances {
        self.positions
            .get(position)
            .map(|p| p.balances)
            .unwrap_or_default()
    }

    pub fn position_operator(&self, position: &AccountId) -> Option<AccountId> {
        self.positions.get(position).map(|p| p.operator)
    }

    pub fn position_voter(&self, position: &AccountId) -> Option<AccountId> {
        self.positions.get(position).map(|p| p.voter)
    }

    pub fn in_validator_set(&self, position: &AccountId) -> bool {
        self.positions
            .get(position)
            .is_some_and(|p| p.in_validator_set)
    }

    pub fn capability_destroyed(&self, position: &AccountId) -> bool {
        self.positions.get(position).is_some_and(|p| p.cap_destroyed)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Advance the lock-up clock by one cycle.
    pub fn end_epoch(&mut self) {
        for position in self.positions.values_mut() {
            let b = &mut position.balances;
            b.active = b.active.saturating_add(b.pending_active);
            b.inactive = b.inactive.saturating_add(b.pending_inactive);
            b.pending_active = Amount::ZERO;
            b.pending_inactive = Amount::ZERO;
        }
        self.epoch += 1;
    }

    /// Compound `amount` of rewards into the position's active stake.
    /// Returns what was actually paid: nothing once the position left the
    /// validator set.
    pub fn distribute_rewards(
        &mut self,
        position: &AccountId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let p = self
            .positions
            .get_mut(position)
            .ok_or(LedgerError::PositionNotFound(*position))?;
        if !p.in_validator_set {
            return Ok(Amount::ZERO);
        }
        p.balances.active = p
            .balances
            .active
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(amount)
    }

    /// Start unlocking stake without going through the owner capability,
    /// as some out-of-band protocol action would.
    pub fn unlock_externally(&mut self, position: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let p = self
            .positions
            .get_mut(position)
            .ok_or(LedgerError::PositionNotFound(*position))?;
        move_between(&mut p.balances, Bucket::Active, Bucket::PendingInactive, amount)
    }

    /// Burn `amount` of the position's active stake, as a protocol penalty
    /// would. The holder of the capability is not consulted.
    pub fn slash(&mut self, position: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let p = self
            .positions
            .get_mut(position)
            .ok_or(LedgerError::PositionNotFound(*position))?;
        take(&mut p.balances, Bucket::Active, amount)
    }

    /// Liquid balances plus every bucket of every position.
    pub fn total_supply(&self) -> Amount {
        let liquid: Amount = self.balances.values().copied().sum();
        let staked: Amount = self
            .positions
            .values()
            .map(|p| p.balances.total_active() + p.balances.total_unlocking())
            .sum();
        liquid + staked
    }

    fn position_mut(&mut self, cap: &OwnerCapability) -> Result<&mut NullPosition, LedgerError> {
        let address = cap.position();
        let p = self
            .positions
            .get_mut(&address)
            .ok_or(LedgerError::PositionNotFound(address))?;
        if p.cap_destroyed {
            return Err(LedgerError::CapabilityDestroyed(address));
        }
        Ok(p)
    }
}

#[derive(Clone, Copy)]
enum Bucket {
    Active,
    Inactive,
    PendingInactive,
}

impl Bucket {
    fn name(self) -> &'static str {
        match self {
            Bucket::Active => "active",
            Bucket::Inactive => "inactive",
            Bucket::PendingInactive => "pending_inactive",
        }
    }

    fn slot(self, balances: &mut StakeBalances) -> &mut Amount {
        match self {
            Bucket::Active => &mut balances.active,
            Bucket::Inactive => &mut balances.inactive,
            Bucket::PendingInactive => &mut balances.pending_inactive,
        }
    }
}

fn take(balances: &mut StakeBalances, from: Bucket, amount: Amount) -> Result<(), LedgerError> {
    let slot = from.slot(balances);
    *slot = slot.checked_sub(amount).ok_or(LedgerError::InsufficientStake {
        bucket: from.name(),
        requested: amount.raw(),
        available: slot.raw(),
    })?;
    Ok(())
}

fn move_between(
    balances: &mut StakeBalances,
    from: Bucket,
    to: Bucket,
    amount: Amount,
) -> Result<(), LedgerError> {
    take(balances, from, amount)?;
    let slot = to.slot(balances);
    *slot = slot.checked_add(amount).ok_or(LedgerError::Overflow)?;
    Ok(())
}

impl StakeLedger for NullLedgers {
    fn create_position(
        &mut self,
        signer: SubAccountSigner,
        funds: Funds,
        operator: &AccountId,
        voter: &AccountId,
    ) -> Result<OwnerCapability, LedgerError> {
        let address = signer.address();
        if self.positions.contains_key(&address) {
            return Err(LedgerError::PositionExists(address));
        }
        self.positions.insert(
            address,
            NullPosition {
                operator: *operator,
                voter: *voter,
                balances: StakeBalances {
                    pending_active: funds.into_value(),
                    ..StakeBalances::default()
                },
                in_validator_set: true,
                cap_destroyed: false,
            },
        );
        Ok(OwnerCapability::mint(signer))
    }

    fn get_balances(&self, position: &AccountId) -> Result<StakeBalances, LedgerError> {
        self.positions
            .get(position)
            .map(|p| p.balances)
            .ok_or(LedgerError::PositionNotFound(*position))
    }

    fn begin_unlock(&mut self, cap: &OwnerCapability, amount: Amount) -> Result<(), LedgerError> {
        let p = self.position_mut(cap)?;
        move_between(&mut p.balances, Bucket::Active, Bucket::PendingInactive, amount)
    }

    fn withdraw(&mut self, cap: &OwnerCapability, amount: Amount) -> Result<Funds, LedgerError> {
        let p = self.position_mut(cap)?;
        take(&mut p.balances, Bucket::Inactive, amount)?;
        Ok(Funds::issue(amount))
    }

    fn set_operator(&mut self, cap: &OwnerCapability, operator: &AccountId) -> Result<(), LedgerError> {
        self.position_mut(cap)?.operator = *operator;
        Ok(())
    }

    fn set_voter(&mut self, cap: &OwnerCapability, voter: &AccountId) -> Result<(), LedgerError> {
        self.position_mut(cap)?.voter = *voter;
        Ok(())
    }

    fn exit_validator_duty(&mut self, position: &AccountId) -> Result<(), LedgerError> {
        let p = self
            .positions
            .get_mut(position)
            .ok_or(LedgerError::PositionNotFound(*position))?;
        p.in_validator_set = false;
        Ok(())
    }

    fn destroy_capability(&mut self, cap: OwnerCapability) -> Result<(), LedgerError> {
        self.position_mut(&cap)?.cap_destroyed = true;
        Ok(())
    }
}

impl AssetLedger for NullLedgers {
    fn credit(&mut self, account: &AccountId, funds: Funds) -> Result<(), LedgerError> {
        let balance = self.balances.entry(*account).or_default();
        *balance = balance
            .checked_add(funds.into_value())
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<Funds, LedgerError> {
        let available = self.balance_of(account);
        let rest = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: *account,
                needed: amount.raw(),
                available: available.raw(),
            })?;
        self.balances.insert(*account, rest);
        Ok(Funds::issue(amount))
    }
}
