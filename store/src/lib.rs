//! Abstract storage traits for Steward.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod registry;

pub use error::StoreError;
pub use registry::{RegistryBackend, RegistryBatch, RegistryStore};
