//! Schema version bookkeeping in the `meta` database.

use heed::types::Bytes;
use heed::{Database, RwTxn};

use crate::{LmdbEnvironment, LmdbError};

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Stamp a fresh database with the current version, or refuse one written
/// by a newer build.
pub(crate) fn ensure_schema(
    wtxn: &mut RwTxn<'_>,
    meta_db: Database<Bytes, Bytes>,
) -> Result<(), LmdbError> {
    let stored = match meta_db.get(wtxn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => decode_version(bytes)?,
        None => 0,
    };

    if stored > CURRENT_SCHEMA_VERSION {
        return Err(LmdbError::UnsupportedSchema {
            found: stored,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    if stored < CURRENT_SCHEMA_VERSION {
        // Version 0 is a blank database; there is nothing older to migrate.
        meta_db.put(wtxn, SCHEMA_VERSION_KEY, &CURRENT_SCHEMA_VERSION.to_le_bytes())?;
        tracing::info!(version = CURRENT_SCHEMA_VERSION, "stamped database schema");
    }
    Ok(())
}

fn decode_version(bytes: &[u8]) -> Result<u32, LmdbError> {
    let arr: [u8; 4] = bytes.try_into().map_err(|_| {
        LmdbError::Serialization("schema_version has unexpected byte length".to_string())
    })?;
    Ok(u32::from_le_bytes(arr))
}

impl LmdbEnvironment {
    /// Read the stored schema version (0 for a database that was never stamped).
    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env().read_txn()?;
        match self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => decode_version(bytes),
            None => Ok(0),
        }
    }
}
