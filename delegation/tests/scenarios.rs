//! End-to-end delegation scenarios over the local substrate.

use std::sync::{Arc, Mutex};

use steward_delegation::{
    CommissionDebt, DelegationEngine, DelegationError, DelegationEvent, Withdrawal,
};
use steward_nullables::LocalSubstrate;
use steward_types::{AccountId, Amount};

fn account(n: u8) -> AccountId {
    AccountId::new([n; 32])
}

fn amt(raw: u128) -> Amount {
    Amount::new(raw)
}

const ALICE: u8 = 1;
const OP_X: u8 = 10;
const OP_Y: u8 = 11;
const OP_Z: u8 = 12;
const VOTER: u8 = 20;

struct Harness {
    engine: DelegationEngine<LocalSubstrate>,
}

impl Harness {
    fn new(alice_balance: u128) -> Self {
        let substrate = LocalSubstrate::new();
        substrate.with_ledgers(|l| l.fund(&account(ALICE), amt(alice_balance)));
        Self {
            engine: DelegationEngine::new(substrate),
        }
    }

    fn delegate(&self, operator: u8, amount: u128, pct: u8) -> AccountId {
        self.engine
            .delegate(&account(ALICE), &account(operator), &account(VOTER), amt(amount), pct)
            .unwrap()
    }

    fn end_epoch(&self) {
        self.engine.substrate().with_ledgers(|l| l.end_epoch());
    }

    fn reward(&self, position: &AccountId, amount: u128) {
        self.engine
            .substrate()
            .with_ledgers(|l| l.distribute_rewards(position, amt(amount)))
            .unwrap();
    }

    fn balance(&self, n: u8) -> Amount {
        self.engine.substrate().with_ledgers(|l| l.balance_of(&account(n)))
    }

    fn switch(&self, from: u8, to: u8) -> Amount {
        self.engine
            .switch_operator(&account(ALICE), &account(from), &account(to))
            .unwrap()
    }

    /// Events committed from here on.
    fn record_events(&mut self) -> Arc<Mutex<Vec<DelegationEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        self.engine
            .subscribe(Box::new(move |event| sink.lock().unwrap().push(event.clone())));
        seen
    }
}

#[test]
fn round_trip_pays_commission_and_returns_the_rest() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.reward(&position, 100);

    let commission = h.engine.request_commission(&account(OP_X), &account(ALICE)).unwrap();
    assert_eq!(commission, amt(10));
    assert_eq!(
        h.engine.last_recorded_principal(&account(ALICE), &account(OP_X)).unwrap(),
        amt(1090)
    );

    h.end_epoch();
    let payout = h.engine.withdraw_commission(&account(OP_X), &account(ALICE)).unwrap();
    assert_eq!(payout.operator_amount, amt(10));
    assert!(payout.debt_payments.is_empty());
    assert_eq!(h.balance(OP_X), amt(10));

    let unlocked = h.engine.end_delegation(&account(ALICE), &account(OP_X)).unwrap();
    assert_eq!(unlocked, amt(1090));
    h.end_epoch();

    let withdrawal = h.engine.withdraw_delegation(&account(ALICE), &account(OP_X)).unwrap();
    assert_eq!(
        withdrawal,
        Withdrawal {
            delegator_amount: amt(1090),
            debt_payments: vec![],
            unpaid_debt: Amount::ZERO,
        }
    );
    assert_eq!(h.balance(ALICE), amt(1090));

    let gone = h.engine.is_active(&account(ALICE), &account(OP_X)).unwrap_err();
    assert!(gone.is_not_found());
    h.engine
        .substrate()
        .with_ledgers(|l| assert!(l.capability_destroyed(&position)));
}

#[test]
fn second_delegation_to_same_operator_fails() {
    let h = Harness::new(5000);
    h.delegate(OP_X, 1000, 10);
    let err = h
        .engine
        .delegate(&account(ALICE), &account(OP_X), &account(VOTER), amt(500), 5)
        .unwrap_err();
    assert!(matches!(err, DelegationError::AlreadyExists { .. }));
    assert_eq!(h.balance(ALICE), amt(4000));
    assert_eq!(h.engine.operators(&account(ALICE)).unwrap(), vec![account(OP_X)]);
}

#[test]
fn zero_rate_commission_request_is_invalid() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 0);
    h.end_epoch();
    h.reward(&position, 100);

    let err = h.engine.request_commission(&account(OP_X), &account(ALICE)).unwrap_err();
    assert!(matches!(err, DelegationError::InvalidState(_)));
}

#[test]
fn request_without_new_rewards_unlocks_nothing() {
    let h = Harness::new(1000);
    h.delegate(OP_X, 1000, 10);
    h.end_epoch();

    assert_eq!(
        h.engine.request_commission(&account(OP_X), &account(ALICE)).unwrap(),
        Amount::ZERO
    );
    let payout = h.engine.withdraw_commission(&account(OP_X), &account(ALICE)).unwrap();
    assert!(payout.operator_amount.is_zero());
}

#[test]
fn unknown_delegator_and_operator_are_not_found() {
    let h = Harness::new(1000);
    let err = h.engine.request_commission(&account(OP_X), &account(ALICE)).unwrap_err();
    assert!(matches!(err, DelegationError::RegistryNotFound(_)));

    h.delegate(OP_X, 100, 10);
    let err = h.engine.end_delegation(&account(ALICE), &account(OP_Y)).unwrap_err();
    assert!(matches!(err, DelegationError::DelegationNotFound { .. }));
}

#[test]
fn withdraw_requires_ended_and_fully_unlocked_delegation() {
    let h = Harness::new(1000);
    h.delegate(OP_X, 1000, 10);
    h.end_epoch();

    let active = h.engine.withdraw_delegation(&account(ALICE), &account(OP_X)).unwrap_err();
    assert!(matches!(active, DelegationError::InvalidState(_)));

    h.engine.end_delegation(&account(ALICE), &account(OP_X)).unwrap();
    let unlocking = h.engine.withdraw_delegation(&account(ALICE), &account(OP_X)).unwrap_err();
    assert!(matches!(unlocking, DelegationError::InvalidState(_)));

    h.end_epoch();
    h.engine.withdraw_delegation(&account(ALICE), &account(OP_X)).unwrap();
    assert_eq!(h.balance(ALICE), amt(1000));
}

#[test]
fn ending_twice_is_already_ended() {
    let h = Harness::new(1000);
    h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.engine.end_delegation(&account(ALICE), &account(OP_X)).unwrap();

    let err = h.engine.end_delegation(&account(ALICE), &account(OP_X)).unwrap_err();
    assert!(matches!(err, DelegationError::AlreadyEnded(op) if op == account(OP_X)));
}

#[test]
fn ended_delegation_rejects_commission_and_switch() {
    let h = Harness::new(1000);
    h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.engine.end_delegation(&account(ALICE), &account(OP_X)).unwrap();

    assert!(matches!(
        h.engine.request_commission(&account(OP_X), &account(ALICE)),
        Err(DelegationError::InvalidState(_))
    ));
    assert!(matches!(
        h.engine.withdraw_commission(&account(OP_X), &account(ALICE)),
        Err(DelegationError::InvalidState(_))
    ));
    assert!(matches!(
        h.engine.switch_operator(&account(ALICE), &account(OP_X), &account(OP_Y)),
        Err(DelegationError::InvalidState(_))
    ));
}

#[test]
fn ending_revokes_operator_and_leaves_validator_set() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.engine.end_delegation(&account(ALICE), &account(OP_X)).unwrap();

    h.engine.substrate().with_ledgers(|l| {
        assert_eq!(l.position_operator(&position), Some(account(ALICE)));
        assert!(!l.in_validator_set(&position));
        assert_eq!(l.balances_of(&position).pending_inactive, amt(1000));
    });
    assert!(!h.engine.is_active(&account(ALICE), &account(OP_X)).unwrap());
}

#[test]
fn switch_records_unpaid_and_unsettled_commission_as_debt() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.reward(&position, 100);
    h.engine.request_commission(&account(OP_X), &account(ALICE)).unwrap();
    h.reward(&position, 50);

    let debt = h
        .engine
        .switch_operator(&account(ALICE), &account(OP_X), &account(OP_Y))
        .unwrap();
    // 10 still unlocking plus 10% of the 50 observed now.
    assert_eq!(debt, amt(15));

    assert_eq!(h.engine.operators(&account(ALICE)).unwrap(), vec![account(OP_Y)]);
    assert_eq!(
        h.engine.outstanding_debts(&account(ALICE), &account(OP_Y)).unwrap(),
        vec![CommissionDebt { creditor: account(OP_X), amount: amt(15) }]
    );
    assert_eq!(h.engine.commission_percentage(&account(ALICE), &account(OP_Y)).unwrap(), 10);
    assert_eq!(h.engine.position_address(&account(ALICE), &account(OP_Y)).unwrap(), position);
    h.engine
        .substrate()
        .with_ledgers(|l| assert_eq!(l.position_operator(&position), Some(account(OP_Y))));
}

#[test]
fn former_operator_is_paid_before_the_current_one() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.reward(&position, 100);
    h.engine.request_commission(&account(OP_X), &account(ALICE)).unwrap();
    h.reward(&position, 50);
    h.engine
        .switch_operator(&account(ALICE), &account(OP_X), &account(OP_Y))
        .unwrap();

    h.end_epoch();
    let first = h.engine.withdraw_commission(&account(OP_Y), &account(ALICE)).unwrap();
    assert!(first.operator_amount.is_zero());
    assert_eq!(
        first.debt_payments,
        vec![CommissionDebt { creditor: account(OP_X), amount: amt(10) }]
    );
    assert_eq!(
        h.engine.outstanding_debts(&account(ALICE), &account(OP_Y)).unwrap(),
        vec![CommissionDebt { creditor: account(OP_X), amount: amt(5) }]
    );

    h.reward(&position, 100);
    assert_eq!(
        h.engine.request_commission(&account(OP_Y), &account(ALICE)).unwrap(),
        amt(10)
    );
    h.end_epoch();
    let second = h.engine.withdraw_commission(&account(OP_Y), &account(ALICE)).unwrap();
    assert_eq!(second.operator_amount, amt(5));
    assert!(h
        .engine
        .outstanding_debts(&account(ALICE), &account(OP_Y))
        .unwrap()
        .is_empty());

    assert_eq!(h.balance(OP_X), amt(15));
    assert_eq!(h.balance(OP_Y), amt(5));
}

#[test]
fn final_withdrawal_settles_debts_first() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.reward(&position, 100);
    h.engine
        .switch_operator(&account(ALICE), &account(OP_X), &account(OP_Y))
        .unwrap();

    h.engine.end_delegation(&account(ALICE), &account(OP_Y)).unwrap();
    h.end_epoch();
    let withdrawal = h.engine.withdraw_delegation(&account(ALICE), &account(OP_Y)).unwrap();

    assert_eq!(withdrawal.delegator_amount, amt(1090));
    assert_eq!(
        withdrawal.debt_payments,
        vec![CommissionDebt { creditor: account(OP_X), amount: amt(10) }]
    );
    assert_eq!(h.balance(OP_X), amt(10));
    assert_eq!(h.balance(ALICE), amt(1090));
}

#[test]
fn switching_twice_owes_unwithdrawn_commission_only_once() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.reward(&position, 100);
    h.engine.request_commission(&account(OP_X), &account(ALICE)).unwrap();

    assert_eq!(h.switch(OP_X, OP_Y), amt(10));
    // The 10 still unlocking is already owed to X; Y accrued nothing.
    assert_eq!(h.switch(OP_Y, OP_Z), Amount::ZERO);
    assert_eq!(
        h.engine.outstanding_debts(&account(ALICE), &account(OP_Z)).unwrap(),
        vec![CommissionDebt { creditor: account(OP_X), amount: amt(10) }]
    );

    h.engine.end_delegation(&account(ALICE), &account(OP_Z)).unwrap();
    h.end_epoch();
    let withdrawal = h.engine.withdraw_delegation(&account(ALICE), &account(OP_Z)).unwrap();

    assert_eq!(withdrawal.unpaid_debt, Amount::ZERO);
    assert_eq!(h.balance(OP_X), amt(10));
    assert!(h.balance(OP_Y).is_zero());
    assert!(h.balance(OP_Z).is_zero());
    assert_eq!(h.balance(ALICE), amt(1090));
}

#[test]
fn withdrawn_commission_is_not_owed_again_after_a_later_switch() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.reward(&position, 100);
    h.engine.request_commission(&account(OP_X), &account(ALICE)).unwrap();
    h.switch(OP_X, OP_Y);

    h.end_epoch();
    let payout = h.engine.withdraw_commission(&account(OP_Y), &account(ALICE)).unwrap();
    assert_eq!(
        payout.debt_payments,
        vec![CommissionDebt { creditor: account(OP_X), amount: amt(10) }]
    );

    h.reward(&position, 50);
    h.engine.request_commission(&account(OP_Y), &account(ALICE)).unwrap();
    // Only Y's own unwithdrawn 5 is carried over.
    assert_eq!(h.switch(OP_Y, OP_Z), amt(5));
    let record_debts = h.engine.outstanding_debts(&account(ALICE), &account(OP_Z)).unwrap();
    assert_eq!(record_debts, vec![CommissionDebt { creditor: account(OP_Y), amount: amt(5) }]);
}

#[test]
fn externally_unlocked_principal_is_not_owed_on_switch() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.engine
        .substrate()
        .with_ledgers(|l| l.unlock_externally(&position, amt(300)))
        .unwrap();

    assert_eq!(h.switch(OP_X, OP_Y), Amount::ZERO);
    h.end_epoch();
    assert_eq!(h.switch(OP_Y, OP_Z), Amount::ZERO);
    assert!(h
        .engine
        .outstanding_debts(&account(ALICE), &account(OP_Z))
        .unwrap()
        .is_empty());

    h.engine.end_delegation(&account(ALICE), &account(OP_Z)).unwrap();
    h.end_epoch();
    let withdrawal = h.engine.withdraw_delegation(&account(ALICE), &account(OP_Z)).unwrap();
    assert_eq!(withdrawal.delegator_amount, amt(1000));
    assert!(h.balance(OP_X).is_zero());
    assert!(h.balance(OP_Y).is_zero());
}

#[test]
fn final_withdrawal_short_of_debts_pays_oldest_first_and_reports_the_rest() {
    let mut h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 50);
    h.end_epoch();
    h.reward(&position, 100);
    assert_eq!(h.switch(OP_X, OP_Y), amt(50));
    h.reward(&position, 100);
    assert_eq!(h.switch(OP_Y, OP_Z), amt(50));

    h.engine
        .substrate()
        .with_ledgers(|l| l.slash(&position, amt(1140)))
        .unwrap();
    assert_eq!(h.engine.end_delegation(&account(ALICE), &account(OP_Z)).unwrap(), amt(60));
    h.end_epoch();

    let events = h.record_events();
    let withdrawal = h.engine.withdraw_delegation(&account(ALICE), &account(OP_Z)).unwrap();

    assert_eq!(
        withdrawal,
        Withdrawal {
            delegator_amount: Amount::ZERO,
            debt_payments: vec![
                CommissionDebt { creditor: account(OP_X), amount: amt(50) },
                CommissionDebt { creditor: account(OP_Y), amount: amt(10) },
            ],
            unpaid_debt: amt(40),
        }
    );
    assert_eq!(h.balance(OP_X), amt(50));
    assert_eq!(h.balance(OP_Y), amt(10));
    assert!(h.balance(ALICE).is_zero());

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            DelegationEvent::DebtPaid {
                delegator: account(ALICE),
                creditor: account(OP_X),
                amount: amt(50),
            },
            DelegationEvent::DebtPaid {
                delegator: account(ALICE),
                creditor: account(OP_Y),
                amount: amt(10),
            },
            DelegationEvent::DelegationWithdrawn {
                delegator: account(ALICE),
                operator: account(OP_Z),
                amount: Amount::ZERO,
                unpaid_debt: amt(40),
            },
        ]
    );

    // The residual is dropped with the record.
    let gone = h.engine.outstanding_debts(&account(ALICE), &account(OP_Z)).unwrap_err();
    assert!(gone.is_not_found());
    h.engine
        .substrate()
        .with_ledgers(|l| assert!(l.capability_destroyed(&position)));
}

#[test]
fn switch_into_existing_operator_is_refused() {
    let h = Harness::new(5000);
    h.delegate(OP_X, 1000, 10);
    h.delegate(OP_Y, 1000, 20);

    let err = h
        .engine
        .switch_operator(&account(ALICE), &account(OP_X), &account(OP_Y))
        .unwrap_err();
    assert!(matches!(err, DelegationError::AlreadyExists { operator, .. } if operator == account(OP_Y)));
    assert_eq!(
        h.engine.operators(&account(ALICE)).unwrap(),
        vec![account(OP_X), account(OP_Y)]
    );
    assert_eq!(h.engine.commission_percentage(&account(ALICE), &account(OP_Y)).unwrap(), 20);
}

#[test]
fn operator_can_be_delegated_to_again_after_a_switch() {
    let h = Harness::new(5000);
    let first = h.delegate(OP_X, 1000, 10);
    h.engine
        .switch_operator(&account(ALICE), &account(OP_X), &account(OP_Z))
        .unwrap();

    let second = h.delegate(OP_X, 500, 10);
    assert_ne!(first, second);
    assert_eq!(
        h.engine.operators(&account(ALICE)).unwrap(),
        vec![account(OP_X), account(OP_Z)]
    );
}

#[test]
fn externally_unlocked_principal_is_not_paid_as_commission() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.end_epoch();
    h.engine
        .substrate()
        .with_ledgers(|l| l.unlock_externally(&position, amt(300)))
        .unwrap();
    h.end_epoch();

    let payout = h.engine.withdraw_commission(&account(OP_X), &account(ALICE)).unwrap();
    assert!(payout.operator_amount.is_zero());
    assert!(h.balance(OP_X).is_zero());
    h.engine
        .substrate()
        .with_ledgers(|l| assert_eq!(l.balances_of(&position).inactive, amt(300)));

    h.engine.end_delegation(&account(ALICE), &account(OP_X)).unwrap();
    h.end_epoch();
    let withdrawal = h.engine.withdraw_delegation(&account(ALICE), &account(OP_X)).unwrap();
    assert_eq!(withdrawal.delegator_amount, amt(1000));
}

#[test]
fn update_voter_reassigns_the_position_vote() {
    let h = Harness::new(1000);
    let position = h.delegate(OP_X, 1000, 10);
    h.engine
        .update_voter(&account(ALICE), &account(OP_X), &account(VOTER + 5))
        .unwrap();
    h.engine
        .substrate()
        .with_ledgers(|l| assert_eq!(l.position_voter(&position), Some(account(VOTER + 5))));
}
