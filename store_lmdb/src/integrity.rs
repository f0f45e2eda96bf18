//! LMDB database integrity checks.
//!
//! Run before serving or inspecting a data directory to detect corruption
//! early.

use std::path::Path;

use heed::types::Bytes;
use heed::Env;

use crate::environment::{META_DB, REGISTRIES_DB};
use crate::LmdbError;

/// Summary of an integrity check run.
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Database names that we expect to exist in a valid Steward LMDB environment.
const EXPECTED_DATABASES: &[&str] = &[REGISTRIES_DB, META_DB];

/// Check LMDB database integrity.
///
/// Opens each expected database and counts entries. Registry keys must be
/// exactly 32 bytes (a delegator id). Any read failures are recorded in the
/// report rather than causing a hard error.
pub fn check_integrity(env: &Env) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport {
        databases_checked: 0,
        total_entries: 0,
        errors: Vec::new(),
    };

    let rtxn = env.read_txn()?;

    for &db_name in EXPECTED_DATABASES {
        match env.open_database::<Bytes, Bytes>(&rtxn, Some(db_name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{}': {}", db_name, e)),
                }
                if db_name == REGISTRIES_DB {
                    check_registry_keys(&db, &rtxn, &mut report);
                }
            }
            Ok(None) => report
                .errors
                .push(format!("database '{}' is missing", db_name)),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{}': {}", db_name, e)),
        }
    }

    Ok(report)
}

fn check_registry_keys(
    db: &heed::Database<Bytes, Bytes>,
    rtxn: &heed::RoTxn<'_>,
    report: &mut IntegrityReport,
) {
    let iter = match db.iter(rtxn) {
        Ok(iter) => iter,
        Err(e) => {
            report.errors.push(format!("failed to iterate registries: {}", e));
            return;
        }
    };
    for item in iter {
        match item {
            Ok((key, _)) if key.len() != 32 => report
                .errors
                .push(format!("registry key has length {}, expected 32", key.len())),
            Ok(_) => {}
            Err(e) => report.errors.push(format!("failed to read registry entry: {}", e)),
        }
    }
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
