//! Exclusive handles over derived accounts and stake positions.

use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Proof of control over a freshly derived sub-account.
///
/// Produced once by the sub-account deriver and consumed when the stake
/// ledger initialises a position at that address.
#[derive(Debug, PartialEq, Eq)]
pub struct SubAccountSigner {
    address: AccountId,
}

impl SubAccountSigner {
    /// Only sub-account derivers construct signers, for addresses they just
    /// derived.
    #[doc(hidden)]
    pub fn new(address: AccountId) -> Self {
        Self { address }
    }

    pub fn address(&self) -> AccountId {
        self.address
    }
}

/// The sole right to mutate one stake position: unlock, withdraw, reassign
/// the operator or voter, and finally destroy.
///
/// Deliberately not `Clone`/`Copy`. Every mutating stake-ledger call borrows
/// it; `StakeLedger::destroy_capability` takes it by value, so it can be
/// consumed at most once.
///
/// A capability comes into existence in exactly two ways: a stake ledger
/// mints it from the position's [`SubAccountSigner`] in `create_position`,
/// or a persisted delegation record that owns it is deserialized.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerCapability {
    position: AccountId,
}

impl OwnerCapability {
    /// Mint the capability for the position at the signer's address,
    /// consuming the signer. Only stake-ledger implementations call this,
    /// when they initialise the position.
    #[doc(hidden)]
    pub fn mint(signer: SubAccountSigner) -> Self {
        Self {
            position: signer.address,
        }
    }

    pub fn position(&self) -> AccountId {
        self.position
    }
}
