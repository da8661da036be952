use super::{FinnyStore, StoreTx};
use crate::{error::StoreResult, types::UserId};
use rusqlite::{params, Connection, OptionalExtension};

// ── Users ──────────────────────────────────────────────────────────

fn ensure_user(conn: &Connection, user_id: UserId, username: &str) -> StoreResult<()> {
    // First touch inserts with the default balance; later touches only
    // refresh the display name.
    conn.execute(
        "INSERT INTO users (user_id, username) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET username = excluded.username",
        params![user_id, username],
    )?;
    Ok(())
}

fn adjust_balance(conn: &Connection, user_id: UserId, delta: i64) -> StoreResult<i64> {
    let balance = conn.query_row(
        "UPDATE users SET fincoins = fincoins + ?1 WHERE user_id = ?2 RETURNING fincoins",
        params![delta, user_id],
        |row| row.get(0),
    )?;
    Ok(balance)
}

fn get_balance(conn: &Connection, user_id: UserId) -> StoreResult<Option<i64>> {
    let balance = conn
        .query_row(
            "SELECT fincoins FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(balance)
}

impl StoreTx<'_> {
    pub fn ensure_user(&self, user_id: UserId, username: &str) -> StoreResult<()> {
        ensure_user(&self.tx, user_id, username)
    }

    /// Add `delta` to the balance in place and return the result.
    /// Fails if the user row does not exist.
    pub fn adjust_balance(&self, user_id: UserId, delta: i64) -> StoreResult<i64> {
        adjust_balance(&self.tx, user_id, delta)
    }
}

impl FinnyStore {
    pub fn ensure_user(&self, user_id: UserId, username: &str) -> StoreResult<()> {
        self.write(|tx| tx.ensure_user(user_id, username))
    }

    pub fn adjust_balance(&self, user_id: UserId, delta: i64) -> StoreResult<i64> {
        self.write(|tx| tx.adjust_balance(user_id, delta))
    }

    pub fn get_balance(&self, user_id: UserId) -> StoreResult<Option<i64>> {
        self.read(|conn| get_balance(conn, user_id))
    }

    pub fn get_username(&self, user_id: UserId) -> StoreResult<Option<String>> {
        self.read(|conn| {
            let name = conn
                .query_row(
                    "SELECT username FROM users WHERE user_id = ?1",
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(name)
        })
    }
}
