//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator of the delegation engine is abstracted behind a trait.
//! This crate provides test-friendly implementations that:
//! - keep all state in memory and never touch the filesystem,
//! - move stake between lock-up buckets only when the test says so,
//! - stage every effect of a unit of work until it commits.
//!
//! Usage: swap real implementations for nullables in tests.

pub mod ledgers;
pub mod registry;
pub mod substrate;

pub use ledgers::NullLedgers;
pub use registry::{NullRegistryBackend, NullRegistryBatch};
pub use substrate::{LocalSubstrate, LocalUnit};
