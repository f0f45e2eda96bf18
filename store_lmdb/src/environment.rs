//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::meta;
use crate::LmdbError;

pub(crate) const REGISTRIES_DB: &str = "registries";
pub(crate) const META_DB: &str = "meta";

const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    pub(crate) registries_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// Creates the directory if needed, creates both databases, and checks
    /// the stored schema version against the one this build understands.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path within this process
        // and the memory map is never mutated outside of heed transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let registries_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(REGISTRIES_DB))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(META_DB))?;
        meta::ensure_schema(&mut wtxn, meta_db)?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env,
            registries_db,
            meta_db,
        })
    }

    /// The underlying heed environment.
    pub fn env(&self) -> &Env {
        &self.env
    }
}
