//! Goal core tests: validation, progress and the completion bonus.

use finny_core::{
    error::GoalError,
    goals::{GoalTracker, MAX_GOAL_TARGET},
    store::FinnyStore,
};
use std::sync::Arc;

fn build() -> (Arc<FinnyStore>, GoalTracker) {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = Arc::new(FinnyStore::in_memory().expect("in-memory store"));
    store.migrate().expect("migrate");
    (store.clone(), GoalTracker::new(store))
}

/// Zero, negative and NaN targets are all rejected before touching the store.
#[test]
fn non_positive_target_is_invalid() {
    let (store, goals) = build();
    for target in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let err = goals.set_goal(1, "alice", "PS5", target, 0.0).unwrap_err();
        assert!(matches!(err, GoalError::InvalidTarget { .. }), "target {target}: {err:?}");
    }
    assert_eq!(store.get_balance(1).unwrap(), None, "user must not be created");
}

#[test]
fn duplicate_name_for_same_user_is_rejected() {
    let (_, goals) = build();
    goals.set_goal(1, "alice", "PS5", 1000.0, 0.0).unwrap();

    let err = goals.set_goal(1, "alice", "PS5", 200.0, 0.0).unwrap_err();
    assert!(matches!(err, GoalError::DuplicateGoal { ref name } if name == "PS5"));
    assert_eq!(err.to_string(), "You already have a goal named 'PS5'");
}

/// Same name for two users: both succeed independently.
#[test]
fn same_name_for_different_users_is_allowed() {
    let (_, goals) = build();
    let a = goals.set_goal(1, "alice", "PS5", 1000.0, 0.0).unwrap();
    let b = goals.set_goal(2, "bob", "PS5", 500.0, 50.0).unwrap();
    assert_ne!(a, b);
    assert_eq!(goals.list_goals(2).unwrap()[0].saved, 50.0);
}

/// Names are matched exactly, case included.
#[test]
fn goal_names_are_case_sensitive() {
    let (_, goals) = build();
    goals.set_goal(1, "alice", "PS5", 1000.0, 0.0).unwrap();
    goals.set_goal(1, "alice", "ps5", 1000.0, 0.0).unwrap();
    assert_eq!(goals.list_goals(1).unwrap().len(), 2);
    assert!(matches!(
        goals.update_goal(1, "Ps5", 10.0),
        Err(GoalError::NoSuchGoal { .. })
    ));
}

/// Updating a goal that does not exist fails and writes nothing.
#[test]
fn update_of_absent_goal_does_not_mutate() {
    let (store, goals) = build();
    goals.set_goal(1, "alice", "Bike", 300.0, 0.0).unwrap();

    let err = goals.update_goal(1, "Car", 50.0).unwrap_err();
    assert!(matches!(err, GoalError::NoSuchGoal { ref name } if name == "Car"));

    assert_eq!(store.get_goal(1, "Bike").unwrap().unwrap().saved, 0.0);
    assert_eq!(store.get_balance(1).unwrap(), Some(100));
    assert_eq!(store.get_transaction_stats(1).unwrap().count, 0);
}

#[test]
fn progress_ratio_is_exact() {
    let (_, goals) = build();
    goals.set_goal(1, "alice", "Trip", 200.0, 0.0).unwrap();
    let progress = goals.update_goal(1, "Trip", 50.0).unwrap();
    assert_eq!(progress.saved, 50.0);
    assert_eq!(progress.ratio, 0.25);
    assert!(!progress.completed);
    assert_eq!(progress.bonus_awarded, None);
}

/// Reaching the target pays 10% of it once; later updates pay nothing.
#[test]
fn completion_bonus_is_paid_once() {
    let (store, goals) = build();
    goals.set_goal(1, "alice", "PS5", 1000.0, 0.0).unwrap();

    let first = goals.update_goal(1, "PS5", 1000.0).unwrap();
    assert!(first.completed);
    assert_eq!(first.ratio, 1.0);
    assert_eq!(first.bonus_awarded, Some(100));
    assert_eq!(first.new_balance, Some(200));

    let second = goals.update_goal(1, "PS5", 50.0).unwrap();
    assert!(second.completed);
    assert!(second.ratio > 1.0, "ratio is not capped");
    assert_eq!(second.bonus_awarded, None);

    // Dropping below and crossing again does not pay a second time.
    goals.update_goal(1, "PS5", -500.0).unwrap();
    let again = goals.update_goal(1, "PS5", 500.0).unwrap();
    assert_eq!(again.bonus_awarded, None);

    assert_eq!(store.get_balance(1).unwrap(), Some(200));
    let stats = store.get_transaction_stats(1).unwrap();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.net_sum, 100);
}

/// The bonus row is a `save` transaction that names the goal.
#[test]
fn completion_bonus_is_logged() {
    let (store, goals) = build();
    goals.set_goal(1, "alice", "Laptop", 500.0, 450.0).unwrap();
    goals.update_goal(1, "Laptop", 60.0).unwrap();

    let txs = store.list_transactions(1, 10).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount, 50);
    assert_eq!(txs[0].kind.as_str(), "save");
    assert!(txs[0].description.contains("Laptop"));
}

/// A goal created already at its target never pays a bonus.
#[test]
fn goal_created_complete_pays_no_bonus() {
    let (store, goals) = build();
    goals.set_goal(1, "alice", "Done", 100.0, 100.0).unwrap();
    let progress = goals.update_goal(1, "Done", 10.0).unwrap();
    assert!(progress.completed);
    assert_eq!(progress.bonus_awarded, None);
    assert_eq!(store.get_balance(1).unwrap(), Some(100));
}

/// Negative amounts are applied as-is, without a floor.
#[test]
fn negative_amount_reduces_saved() {
    let (_, goals) = build();
    goals.set_goal(1, "alice", "Bike", 300.0, 20.0).unwrap();
    let progress = goals.update_goal(1, "Bike", -50.0).unwrap();
    assert_eq!(progress.saved, -30.0);
    assert!(matches!(
        goals.update_goal(1, "Bike", f64::NAN),
        Err(GoalError::InvalidAmount { .. })
    ));
}

#[test]
fn goals_listed_in_creation_order() {
    let (_, goals) = build();
    for name in ["Zebra", "Apple", "Mango"] {
        goals.set_goal(1, "alice", name, 100.0, 25.0).unwrap();
    }
    let listed = goals.list_goals(1).unwrap();
    let names: Vec<_> = listed.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Zebra", "Apple", "Mango"]);
    assert!(listed.iter().all(|g| g.ratio == 0.25));
}

/// Dropping below and climbing back on a goal that started complete pays nothing.
#[test]
fn goal_created_complete_never_pays_after_recross() {
    let (store, goals) = build();
    goals.set_goal(1, "alice", "Done", 100.0, 100.0).unwrap();
    assert!(store.get_goal(1, "Done").unwrap().unwrap().bonus_paid);

    let below = goals.update_goal(1, "Done", -50.0).unwrap();
    assert!(!below.completed);
    let back = goals.update_goal(1, "Done", 50.0).unwrap();
    assert!(back.completed);
    assert_eq!(back.bonus_awarded, None);

    assert_eq!(store.get_balance(1).unwrap(), Some(100));
    assert_eq!(store.get_transaction_stats(1).unwrap().count, 0);
}

/// Targets whose bonus could not fit a balance are refused up front.
#[test]
fn oversized_target_is_invalid() {
    let (store, goals) = build();
    let err = goals.set_goal(1, "alice", "Moon", 1e20, 0.0).unwrap_err();
    assert!(matches!(err, GoalError::InvalidTarget { .. }), "got {err:?}");
    assert!(store.list_goals(1).unwrap().is_empty());

    goals.set_goal(1, "alice", "Big", MAX_GOAL_TARGET, 0.0).unwrap();
    let progress = goals.update_goal(1, "Big", MAX_GOAL_TARGET).unwrap();
    assert_eq!(progress.bonus_awarded, Some(100_000_000_000_000));
    assert_eq!(store.get_balance(1).unwrap(), Some(100_000_000_000_100));
}

/// A bonus that rounds to zero completes the goal without a ledger row.
#[test]
fn zero_bonus_writes_no_transaction() {
    let (store, goals) = build();
    goals.set_goal(1, "alice", "Gum", 4.0, 0.0).unwrap();
    let progress = goals.update_goal(1, "Gum", 4.0).unwrap();
    assert!(progress.completed);
    assert_eq!(progress.bonus_awarded, None);
    assert!(store.get_goal(1, "Gum").unwrap().unwrap().bonus_paid);
    assert!(store.list_transactions(1, 10).unwrap().is_empty());
}
