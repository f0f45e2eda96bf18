//! Sub-account address derivation.
//!
//! A derived address is the Blake2b-256 hash of `creator ++ seed ++ [DERIVED_ACCOUNT_SCHEME]`.
//! The trailing scheme byte keeps derived addresses out of the space of
//! ordinary hashes over the same bytes.

use steward_types::AccountId;

use crate::hash::blake2b_256_multi;

/// Scheme byte appended to every derivation preimage.
pub const DERIVED_ACCOUNT_SCHEME: u8 = 0xfe;

/// Derive the address of the sub-account `creator` controls under `seed`.
pub fn derive_sub_account(creator: &AccountId, seed: &[u8]) -> AccountId {
    AccountId::new(blake2b_256_multi(&[
        creator.as_bytes(),
        seed,
        &[DERIVED_ACCOUNT_SCHEME],
    ]))
}
