//! LMDB storage backend for Steward.
//!
//! Implements the registry traits from `steward-store` using the `heed` LMDB
//! bindings. Registries and metadata live in two databases within a single
//! environment.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod meta;
pub mod registry;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use registry::RegistryWriteBatch;
