//! Events published after a delegation operation commits.

use steward_types::{AccountId, Amount};

/// Delegation-level events that observers can subscribe to via the [`EventBus`].
///
/// Events are collected while an operation runs and only published once its
/// unit of work has committed; an aborted operation publishes nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DelegationEvent {
    /// A new position was created and staked.
    Delegated {
        delegator: AccountId,
        operator: AccountId,
        voter: AccountId,
        position: AccountId,
        amount: Amount,
        commission_percentage: u8,
    },
    /// Commission on newly observed rewards started unlocking.
    CommissionRequested {
        delegator: AccountId,
        operator: AccountId,
        accrued_rewards: Amount,
        commission: Amount,
    },
    /// The current operator was paid withdrawn commission.
    CommissionWithdrawn {
        delegator: AccountId,
        operator: AccountId,
        amount: Amount,
    },
    /// A former operator was paid (part of) an outstanding debt.
    DebtPaid {
        delegator: AccountId,
        creditor: AccountId,
        amount: Amount,
    },
    OperatorSwitched {
        delegator: AccountId,
        old_operator: AccountId,
        new_operator: AccountId,
        debt_recorded: Amount,
    },
    VoterUpdated {
        delegator: AccountId,
        operator: AccountId,
        voter: AccountId,
    },
    /// The delegation stopped and its active stake started unlocking.
    DelegationEnded {
        delegator: AccountId,
        operator: AccountId,
        unlocked: Amount,
    },
    /// The position was wound down and its capability destroyed.
    DelegationWithdrawn {
        delegator: AccountId,
        operator: AccountId,
        amount: Amount,
        unpaid_debt: Amount,
    },
}

/// Synchronous fan-out event bus for delegation events.
///
/// Listeners are invoked inline on the calling thread after commit; keep
/// handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&DelegationEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&DelegationEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &DelegationEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn account(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&DelegationEvent::VoterUpdated {
            delegator: account(1),
            operator: account(2),
            voter: account(3),
        });

        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn listener_receives_correct_event_variant() {
        let saw_paid = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let sp = Arc::clone(&saw_paid);
        bus.subscribe(Box::new(move |event| {
            if let DelegationEvent::DebtPaid { amount, .. } = event {
                sp.fetch_add(amount.raw() as usize, Ordering::SeqCst);
            }
        }));

        bus.emit(&DelegationEvent::DebtPaid {
            delegator: account(1),
            creditor: account(2),
            amount: Amount::new(7),
        });
        bus.emit(&DelegationEvent::CommissionWithdrawn {
            delegator: account(1),
            operator: account(3),
            amount: Amount::new(100),
        });

        assert_eq!(saw_paid.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn default_creates_empty_bus() {
        let bus = EventBus::default();
        assert!(bus.listeners.is_empty());
    }
}
