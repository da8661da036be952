use super::{FinnyStore, StoreTx, TransactionRecord, TransactionStats};
use crate::{
    error::StoreResult,
    types::{TxId, TxKind, UserId},
};
use rusqlite::{params, types::Type, Connection};

// ── Transaction log ────────────────────────────────────────────────

fn record_transaction(
    conn: &Connection,
    user_id: UserId,
    amount: i64,
    kind: TxKind,
    description: &str,
) -> StoreResult<TxId> {
    conn.execute(
        "INSERT INTO transactions (user_id, amount, type, description) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, amount, kind.as_str(), description],
    )?;
    Ok(conn.last_insert_rowid())
}

impl StoreTx<'_> {
    /// Append an immutable row. The timestamp is assigned by SQLite.
    pub fn record_transaction(
        &self,
        user_id: UserId,
        amount: i64,
        kind: TxKind,
        description: &str,
    ) -> StoreResult<TxId> {
        record_transaction(&self.tx, user_id, amount, kind, description)
    }
}

impl FinnyStore {
    pub fn record_transaction(
        &self,
        user_id: UserId,
        amount: i64,
        kind: TxKind,
        description: &str,
    ) -> StoreResult<TxId> {
        self.write(|tx| tx.record_transaction(user_id, amount, kind, description))
    }

    pub fn get_transaction_stats(&self, user_id: UserId) -> StoreResult<TransactionStats> {
        self.read(|conn| {
            let stats = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(amount), 0) FROM transactions WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(TransactionStats {
                        count: row.get(0)?,
                        net_sum: row.get(1)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }

    /// Most recent first.
    pub fn list_transactions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> StoreResult<Vec<TransactionRecord>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT tx_id, user_id, amount, type, description, timestamp
                 FROM transactions WHERE user_id = ?1
                 ORDER BY tx_id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit], |row| {
                let kind: String = row.get(3)?;
                let kind = TxKind::parse(&kind).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        Type::Text,
                        format!("unknown transaction type '{kind}'").into(),
                    )
                })?;
                Ok(TransactionRecord {
                    tx_id: row.get(0)?,
                    user_id: row.get(1)?,
                    amount: row.get(2)?,
                    kind,
                    description: row.get(4)?,
                    timestamp: row.get(5)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }
}
