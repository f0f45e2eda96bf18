//! The delegation engine running over the LMDB registry store.

use steward_delegation::{DelegationEngine, DelegationError, DelegationRegistry};
use steward_nullables::LocalSubstrate;
use steward_store_lmdb::LmdbEnvironment;
use steward_types::{AccountId, Amount};

const MAP_SIZE: usize = 10 * 1024 * 1024;

fn account(n: u8) -> AccountId {
    AccountId::new([n; 32])
}

fn engine_at(path: &std::path::Path) -> DelegationEngine<LocalSubstrate<LmdbEnvironment>> {
    let env = LmdbEnvironment::open(path, MAP_SIZE).unwrap();
    let substrate = LocalSubstrate::with_backend(env);
    substrate.with_ledgers(|l| l.fund(&account(1), Amount::new(1000)));
    DelegationEngine::new(substrate)
}

#[test]
fn committed_registry_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let position = {
        let engine = engine_at(dir.path());
        engine
            .delegate(&account(1), &account(10), &account(20), Amount::new(400), 15)
            .unwrap()
    };

    let env = LmdbEnvironment::open(dir.path(), MAP_SIZE).unwrap();
    let bytes = env.read_registry(&account(1)).unwrap().unwrap();
    let registry = DelegationRegistry::decode(&bytes).unwrap();
    let record = registry.get(&account(10)).unwrap();
    assert_eq!(record.position_id(), position);
    assert_eq!(record.principal_amount(), Amount::new(400));
    assert_eq!(record.commission_rate().percent(), 15);
    assert!(record.is_active());
}

#[test]
fn aborted_operation_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_at(dir.path());
    engine
        .delegate(&account(1), &account(10), &account(20), Amount::new(400), 15)
        .unwrap();
    let before = engine.substrate().backend().read_registry(&account(1)).unwrap();

    // Still pending activation, so ending fails after the operator was
    // already reassigned inside the unit.
    let err = engine.end_delegation(&account(1), &account(10)).unwrap_err();
    assert!(matches!(err, DelegationError::InvalidState(_)));

    let dup = engine
        .delegate(&account(1), &account(10), &account(20), Amount::new(100), 5)
        .unwrap_err();
    assert!(matches!(dup, DelegationError::AlreadyExists { .. }));

    assert_eq!(engine.substrate().backend().read_registry(&account(1)).unwrap(), before);
    assert_eq!(engine.substrate().backend().read_delegators().unwrap(), vec![account(1)]);
}

#[test]
fn full_lifecycle_persists_removal() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_at(dir.path());
    let position = engine
        .delegate(&account(1), &account(10), &account(20), Amount::new(1000), 10)
        .unwrap();
    engine.substrate().with_ledgers(|l| {
        l.end_epoch();
        l.distribute_rewards(&position, Amount::new(100)).unwrap();
    });

    engine.request_commission(&account(10), &account(1)).unwrap();
    engine.substrate().with_ledgers(|l| l.end_epoch());
    engine.withdraw_commission(&account(10), &account(1)).unwrap();
    engine.end_delegation(&account(1), &account(10)).unwrap();
    engine.substrate().with_ledgers(|l| l.end_epoch());
    let withdrawal = engine.withdraw_delegation(&account(1), &account(10)).unwrap();

    assert_eq!(withdrawal.delegator_amount, Amount::new(1090));
    assert!(engine.operators(&account(1)).unwrap().is_empty());

    let bytes = engine.substrate().backend().read_registry(&account(1)).unwrap().unwrap();
    let registry = DelegationRegistry::decode(&bytes).unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.positions_created(), 1);
}
