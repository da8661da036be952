//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The ledger and goal cores call store methods; they never execute SQL directly.
//!
//! One long-lived connection is shared behind a mutex. Every operation holds
//! the guard for its own scope only, so concurrent writers for the same user
//! are serialized and no balance update is lost.

use crate::{
    error::{StoreError, StoreResult},
    types::{GoalId, TxId, TxKind, UserId},
};
use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

mod goal;
mod transaction;
mod user;

pub struct FinnyStore {
    conn: Mutex<Connection>,
    path: Option<String>, // None for :memory:, Some(path) for file
}

/// A write transaction in progress. Dropping it without commit rolls back.
pub struct StoreTx<'conn> {
    tx: rusqlite::Transaction<'conn>,
}

// ── Rows ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub tx_id: TxId,
    pub user_id: UserId,
    pub amount: i64,
    pub kind: TxKind,
    pub description: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionStats {
    pub count: i64,
    pub net_sum: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalRecord {
    pub goal_id: GoalId,
    pub user_id: UserId,
    pub name: String,
    pub target: f64,
    pub saved: f64,
    pub bonus_paid: bool,
}

impl FinnyStore {
    /// Open (or create) the bot database at `path`.
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order. Safe to run on every start.
    pub fn migrate(&self) -> StoreResult<()> {
        self.lock()
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    /// Run `f` inside one immediate write transaction.
    ///
    /// Commits when `f` returns `Ok`; rolls back on `Err` or unwind.
    pub fn write<T, E>(&self, f: impl FnOnce(&StoreTx<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut conn = self.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let store_tx = StoreTx { tx };
        let out = f(&store_tx)?;
        store_tx.tx.commit().map_err(StoreError::from)?;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let conn = self.lock();
        f(&conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-write leaves the transaction rolled back by drop, so the
        // connection is still consistent.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn execute_batch_for_tests(&self, sql: &str) -> StoreResult<()> {
        self.lock().execute_batch(sql)?;
        Ok(())
    }
}
