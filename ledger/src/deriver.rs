//! Deterministic sub-account derivation.

use steward_crypto::derive_sub_account;
use steward_types::{AccountId, SubAccountSigner};

/// Derives a fresh account controlled by `creator` from a seed.
///
/// Must be deterministic, and collision-free as long as seeds are unique per
/// creator.
pub trait SubAccountDeriver {
    fn derive(&self, creator: &AccountId, seed: &[u8]) -> (SubAccountSigner, AccountId);
}

/// Blake2b-based deriver (see [`steward_crypto::derive_sub_account`]).
#[derive(Clone, Copy, Debug, Default)]
pub struct HashDeriver;

impl SubAccountDeriver for HashDeriver {
    fn derive(&self, creator: &AccountId, seed: &[u8]) -> (SubAccountSigner, AccountId) {
        let address = derive_sub_account(creator, seed);
        (SubAccountSigner::new(address), address)
    }
}
