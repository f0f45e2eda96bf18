//! Cryptographic primitives for Steward.
//!
//! - **Blake2b** for hashing
//! - Deterministic sub-account address derivation for stake positions

pub mod derive;
pub mod hash;

pub use derive::{derive_sub_account, DERIVED_ACCOUNT_SCHEME};
pub use hash::blake2b_256_multi;
