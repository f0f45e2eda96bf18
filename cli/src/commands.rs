//! Read-only inspection commands over an LMDB data directory.

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use std::path::Path;

use steward_delegation::{DelegationRecord, DelegationRegistry};
use steward_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use steward_types::AccountId;

use crate::config::StewardConfig;

#[derive(Debug, Serialize)]
pub struct RegistrySummary {
    pub delegator: String,
    pub delegations: usize,
    pub positions_created: u64,
}

#[derive(Debug, Serialize)]
pub struct RegistryDetail {
    pub delegator: String,
    pub positions_created: u64,
    pub delegations: Vec<DelegationDetail>,
}

/// Amounts are rendered as decimal strings; JSON numbers lose precision
/// beyond 2^53.
#[derive(Debug, Serialize)]
pub struct DelegationDetail {
    pub operator: String,
    pub position: String,
    pub principal_amount: String,
    pub commission_percentage: u8,
    pub is_active: bool,
    pub commission_unlocking: String,
    pub commission_in_debt: String,
    pub debts: Vec<DebtDetail>,
}

#[derive(Debug, Serialize)]
pub struct DebtDetail {
    pub creditor: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct IntegritySummary {
    pub data_dir: String,
    pub schema_version: u32,
    pub databases_checked: u32,
    pub total_entries: u64,
    pub healthy: bool,
    pub errors: Vec<String>,
}

impl DelegationDetail {
    fn new(operator: &AccountId, record: &DelegationRecord) -> Self {
        Self {
            operator: operator.to_string(),
            position: record.position_id().to_string(),
            principal_amount: record.principal_amount().to_string(),
            commission_percentage: record.commission_rate().percent(),
            is_active: record.is_active(),
            commission_unlocking: record.commission_unlocking().to_string(),
            commission_in_debt: record.commission_in_debt().to_string(),
            debts: record
                .debts()
                .iter()
                .map(|d| DebtDetail {
                    creditor: d.creditor.to_string(),
                    amount: d.amount.to_string(),
                })
                .collect(),
        }
    }
}

/// Open an existing data directory. Never creates one.
pub fn open_existing(data_dir: &Path, map_size: usize) -> anyhow::Result<LmdbEnvironment> {
    if !data_dir.exists() {
        bail!("no data directory at {}", data_dir.display());
    }
    check_data_dir(data_dir).map_err(|e| anyhow!(e))?;
    LmdbEnvironment::open(data_dir, map_size)
        .with_context(|| format!("failed to open LMDB environment at {}", data_dir.display()))
}

fn load_registry(env: &LmdbEnvironment, delegator: &AccountId) -> anyhow::Result<Option<DelegationRegistry>> {
    match env.read_registry(delegator)? {
        Some(bytes) => Ok(Some(
            DelegationRegistry::decode(&bytes)
                .with_context(|| format!("corrupt registry for delegator {delegator}"))?,
        )),
        None => Ok(None),
    }
}

pub fn list_registries(env: &LmdbEnvironment) -> anyhow::Result<Vec<RegistrySummary>> {
    let mut summaries = Vec::new();
    for delegator in env.read_delegators()? {
        let Some(registry) = load_registry(env, &delegator)? else {
            continue;
        };
        summaries.push(RegistrySummary {
            delegator: delegator.to_string(),
            delegations: registry.len(),
            positions_created: registry.positions_created(),
        });
    }
    tracing::debug!(count = summaries.len(), "listed registries");
    Ok(summaries)
}

pub fn show_registry(env: &LmdbEnvironment, delegator: &AccountId) -> anyhow::Result<RegistryDetail> {
    let registry = load_registry(env, delegator)?
        .ok_or_else(|| anyhow!("delegator {delegator} has no registry"))?;
    Ok(RegistryDetail {
        delegator: delegator.to_string(),
        positions_created: registry.positions_created(),
        delegations: registry
            .iter()
            .map(|(operator, record)| DelegationDetail::new(operator, record))
            .collect(),
    })
}

pub fn check_database(config: &StewardConfig) -> anyhow::Result<IntegritySummary> {
    let env = open_existing(&config.data_dir, config.map_size_bytes())?;
    let report = check_integrity(env.env())?;
    Ok(IntegritySummary {
        data_dir: config.data_dir.display().to_string(),
        schema_version: env.schema_version()?,
        databases_checked: report.databases_checked,
        total_entries: report.total_entries,
        healthy: report.is_healthy(),
        errors: report.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_delegation::DelegationEngine;
    use steward_nullables::LocalSubstrate;
    use steward_types::Amount;

    const MAP_SIZE: usize = 10 * 1024 * 1024;

    fn account(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    fn populated(dir: &Path) -> AccountId {
        let env = LmdbEnvironment::open(dir, MAP_SIZE).unwrap();
        let substrate = LocalSubstrate::with_backend(env);
        substrate.with_ledgers(|l| l.fund(&account(1), Amount::new(300)));
        let engine = DelegationEngine::new(substrate);
        engine
            .delegate(&account(1), &account(10), &account(20), Amount::new(100), 10)
            .unwrap();
        engine
            .delegate(&account(1), &account(11), &account(20), Amount::new(200), 5)
            .unwrap()
    }

    #[test]
    fn lists_and_shows_stored_registries() {
        let dir = tempfile::tempdir().unwrap();
        let position = populated(dir.path());

        let env = open_existing(dir.path(), MAP_SIZE).unwrap();
        let summaries = list_registries(&env).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].delegator, account(1).to_string());
        assert_eq!(summaries[0].delegations, 2);
        assert_eq!(summaries[0].positions_created, 2);

        let detail = show_registry(&env, &account(1)).unwrap();
        assert_eq!(detail.delegations.len(), 2);
        let second = &detail.delegations[1];
        assert_eq!(second.operator, account(11).to_string());
        assert_eq!(second.position, position.to_string());
        assert_eq!(second.principal_amount, "200");
        assert_eq!(second.commission_percentage, 5);
        assert!(second.is_active);
    }

    #[test]
    fn show_unknown_delegator_fails() {
        let dir = tempfile::tempdir().unwrap();
        populated(dir.path());
        let env = open_existing(dir.path(), MAP_SIZE).unwrap();
        assert!(show_registry(&env, &account(9)).is_err());
    }

    #[test]
    fn missing_data_dir_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        assert!(open_existing(&path, MAP_SIZE).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn check_reports_healthy_store() {
        let dir = tempfile::tempdir().unwrap();
        populated(dir.path());
        let config = StewardConfig {
            data_dir: dir.path().to_path_buf(),
            map_size_mb: 10,
            ..StewardConfig::default()
        };

        let summary = check_database(&config).unwrap();
        assert!(summary.healthy);
        assert_eq!(summary.schema_version, 1);
        assert_eq!(summary.databases_checked, 2);
    }
}
