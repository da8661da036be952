//! Ledger core tests: balance arithmetic, the audit trail and concurrent writers.

use finny_core::{
    ledger::Ledger,
    store::FinnyStore,
    types::{TxKind, STARTING_BALANCE},
};
use std::sync::Arc;
use std::thread;

fn build() -> Ledger {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = FinnyStore::in_memory().expect("in-memory store");
    store.migrate().expect("migrate");
    Ledger::new(Arc::new(store))
}

/// A new user starts at 100 and moves by exactly the applied delta.
#[test]
fn first_decision_starts_from_default_balance() {
    let ledger = build();
    let balance = ledger.apply_decision(1, "alice", 5, TxKind::Save, "cooked ramen").unwrap();
    assert_eq!(balance, STARTING_BALANCE + 5);

    let history = ledger.history(1, 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TxKind::Save);
    assert_eq!(history[0].amount, 5);
    assert_eq!(history[0].description, "cooked ramen");
}

/// Final balance equals 100 plus the sum of every applied delta.
#[test]
fn balance_equals_start_plus_sum_of_deltas() {
    let ledger = build();
    let deltas = [-10, 5, 5, -20, 7, 0, -3, 15];
    for (i, delta) in deltas.iter().enumerate() {
        let kind = if *delta < 0 { TxKind::Spend } else { TxKind::Save };
        ledger.apply_decision(9, "ivan", *delta, kind, &format!("round {i}")).unwrap();
    }

    let summary = ledger.summary(9).unwrap();
    let sum: i64 = deltas.iter().sum();
    assert_eq!(summary.balance, STARTING_BALANCE + sum);
    assert_eq!(summary.net_change, sum);
    assert_eq!(summary.tx_count, deltas.len() as i64);
    assert_eq!(summary.drift, 0);
}

/// Balances may go below zero; no floor is applied.
#[test]
fn balance_can_go_negative() {
    let ledger = build();
    let balance = ledger.apply_decision(2, "bob", -150, TxKind::Spend, "sneakers").unwrap();
    assert_eq!(balance, -50);
}

/// Many threads hammering one user lose no updates.
#[test]
fn concurrent_decisions_for_one_user_are_not_lost() {
    let ledger = build();
    let threads = 8;
    let per_thread = 25;

    thread::scope(|s| {
        for t in 0..threads {
            let ledger = &ledger;
            s.spawn(move || {
                for i in 0..per_thread {
                    let (delta, kind) = if (t + i) % 2 == 0 {
                        (5, TxKind::Save)
                    } else {
                        (-3, TxKind::Spend)
                    };
                    ledger
                        .apply_decision(77, "double-clicker", delta, kind, "click")
                        .unwrap();
                }
            });
        }
    });

    let mut expected = STARTING_BALANCE;
    for t in 0..threads {
        for i in 0..per_thread {
            expected += if (t + i) % 2 == 0 { 5 } else { -3 };
        }
    }

    let summary = ledger.summary(77).unwrap();
    assert_eq!(summary.balance, expected);
    assert_eq!(summary.tx_count, (threads * per_thread) as i64);
    assert_eq!(summary.drift, 0, "every balance change must have its row");
}

/// Users never see each other's balance or history.
#[test]
fn users_are_independent() {
    let ledger = build();
    ledger.apply_decision(1, "alice", 5, TxKind::Save, "a").unwrap();
    ledger.apply_decision(2, "bob", -10, TxKind::Spend, "b").unwrap();

    assert_eq!(ledger.balance(1).unwrap(), 105);
    assert_eq!(ledger.balance(2).unwrap(), 90);
    assert_eq!(ledger.history(1, 10).unwrap().len(), 1);
    assert_eq!(ledger.history(2, 10).unwrap()[0].amount, -10);
}

/// History honours the limit and lists newest rows first.
#[test]
fn history_is_newest_first_and_limited() {
    let ledger = build();
    for i in 0..15 {
        ledger.apply_decision(3, "carol", i, TxKind::Save, &format!("r{i}")).unwrap();
    }

    let history = ledger.history(3, 10).unwrap();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].description, "r14");
    assert_eq!(history[9].description, "r5");
    assert!(history.windows(2).all(|w| w[0].tx_id > w[1].tx_id));
}
