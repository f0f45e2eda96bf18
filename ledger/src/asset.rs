//! Liquid balances of the staked asset.

use steward_types::{AccountId, Amount, Funds};

use crate::LedgerError;

/// The fungible-asset transfer primitive.
///
/// Splitting and valuing funds are operations on [`Funds`] itself; the ledger
/// only moves value between accounts and in-flight funds.
pub trait AssetLedger {
    /// Deposit `funds` into `account`.
    fn credit(&mut self, account: &AccountId, funds: Funds) -> Result<(), LedgerError>;

    /// Take `amount` out of `account`.
    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<Funds, LedgerError>;
}
