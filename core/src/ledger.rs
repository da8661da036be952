//! Ledger core: the one sanctioned way to move a user's FinCoin balance.
//!
//! Every balance change is paired with exactly one transaction row, and both
//! land in the same store transaction.

use crate::{
    error::{LedgerError, StoreResult},
    store::{FinnyStore, StoreTx, TransactionRecord},
    types::{TxKind, UserId, STARTING_BALANCE},
};
use serde::Serialize;
use std::sync::Arc;

/// Derived view over a user's balance and transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub balance: i64,
    pub tx_count: i64,
    pub net_change: i64,
    /// `balance - (STARTING_BALANCE + net_change)`. Zero when the log
    /// explains the balance. Reported only, never corrected.
    pub drift: i64,
}

pub struct Ledger {
    store: Arc<FinnyStore>,
}

impl Ledger {
    pub fn new(store: Arc<FinnyStore>) -> Self {
        Self { store }
    }

    /// Apply a gameplay decision: ensure the user exists, move the balance
    /// by `delta` and log it. All or nothing.
    ///
    /// The sign of `delta` is not checked against `kind`.
    pub fn apply_decision(
        &self,
        user_id: UserId,
        display_name: &str,
        delta: i64,
        kind: TxKind,
        description: &str,
    ) -> Result<i64, LedgerError> {
        let balance = self.store.write(|tx| {
            tx.ensure_user(user_id, display_name)?;
            apply_in(tx, user_id, delta, kind, description)
        })?;
        log::debug!("user={user_id} {kind} delta={delta} balance={balance}");
        Ok(balance)
    }

    /// Current balance. Users who never played read as the starting balance.
    pub fn balance(&self, user_id: UserId) -> Result<i64, LedgerError> {
        Ok(self
            .store
            .get_balance(user_id)?
            .unwrap_or(STARTING_BALANCE))
    }

    pub fn history(&self, user_id: UserId, limit: u32) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self.store.list_transactions(user_id, limit)?)
    }

    pub fn summary(&self, user_id: UserId) -> Result<LedgerSummary, LedgerError> {
        let balance = self.balance(user_id)?;
        let stats = self.store.get_transaction_stats(user_id)?;
        Ok(LedgerSummary {
            balance,
            tx_count: stats.count,
            net_change: stats.net_sum,
            drift: balance - (STARTING_BALANCE + stats.net_sum),
        })
    }
}

/// The atomic primitive: adjust the balance, then record the row, inside
/// the caller's transaction. The user row must already exist.
pub(crate) fn apply_in(
    tx: &StoreTx<'_>,
    user_id: UserId,
    delta: i64,
    kind: TxKind,
    description: &str,
) -> StoreResult<i64> {
    let balance = tx.adjust_balance(user_id, delta)?;
    tx.record_transaction(user_id, delta, kind, description)?;
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> (Arc<FinnyStore>, Ledger) {
        let store = Arc::new(FinnyStore::in_memory().unwrap());
        store.migrate().unwrap();
        (store.clone(), Ledger::new(store))
    }

    /// A failure between the balance write and the log write leaves neither.
    #[test]
    fn failed_transaction_write_rolls_back_balance() {
        let (store, ledger) = ledger();
        ledger.apply_decision(1, "alice", 5, TxKind::Save, "warm-up").unwrap();

        store
            .execute_batch_for_tests(
                "CREATE TRIGGER fail_tx BEFORE INSERT ON transactions
                 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
            )
            .unwrap();

        let err = ledger
            .apply_decision(1, "alice", -10, TxKind::Spend, "doomed")
            .unwrap_err();
        assert!(matches!(err, LedgerError::StoreFailure(_)));

        let summary = ledger.summary(1).unwrap();
        assert_eq!(summary.balance, 105, "balance must not move without its row");
        assert_eq!(summary.tx_count, 1);
        assert_eq!(summary.drift, 0);
    }

    /// A failure on first touch leaves no user row behind either.
    #[test]
    fn failed_first_decision_creates_nothing() {
        let (store, ledger) = ledger();
        store
            .execute_batch_for_tests(
                "CREATE TRIGGER fail_tx BEFORE INSERT ON transactions
                 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
            )
            .unwrap();

        assert!(ledger.apply_decision(3, "carol", 5, TxKind::Save, "x").is_err());
        assert_eq!(store.get_balance(3).unwrap(), None);
    }

    #[test]
    fn unknown_user_reads_starting_balance() {
        let (_, ledger) = ledger();
        assert_eq!(ledger.balance(42).unwrap(), STARTING_BALANCE);
    }

    #[test]
    fn sign_is_not_checked_against_kind() {
        let (_, ledger) = ledger();
        let balance = ledger.apply_decision(1, "alice", 20, TxKind::Spend, "odd").unwrap();
        assert_eq!(balance, 120);
        let history = ledger.history(1, 10).unwrap();
        assert_eq!(history[0].kind, TxKind::Spend);
        assert_eq!(history[0].amount, 20);
    }
}
