use super::{FinnyStore, GoalRecord, StoreTx};
use crate::{
    error::{StoreError, StoreResult},
    types::{GoalId, UserId},
};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};

// ── Goals ──────────────────────────────────────────────────────────

const GOAL_COLUMNS: &str = "goal_id, user_id, name, target, saved, bonus_paid";

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<GoalRecord> {
    Ok(GoalRecord {
        goal_id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target: row.get(3)?,
        saved: row.get(4)?,
        bonus_paid: row.get::<_, i32>(5)? != 0,
    })
}

fn get_goal(conn: &Connection, user_id: UserId, name: &str) -> StoreResult<Option<GoalRecord>> {
    let goal = conn
        .query_row(
            &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ?1 AND name = ?2"),
            params![user_id, name],
            goal_from_row,
        )
        .optional()?;
    Ok(goal)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl StoreTx<'_> {
    /// Insert a goal. Names are unique per user (exact, case-sensitive).
    pub fn create_goal(
        &self,
        user_id: UserId,
        name: &str,
        target: f64,
        initial_saved: f64,
    ) -> StoreResult<GoalId> {
        if get_goal(&self.tx, user_id, name)?.is_some() {
            return Err(StoreError::DuplicateGoal { name: name.to_string() });
        }
        self.tx
            .execute(
                "INSERT INTO goals (user_id, name, target, saved) VALUES (?1, ?2, ?3, ?4)",
                params![user_id, name, target, initial_saved],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateGoal { name: name.to_string() }
                } else {
                    e.into()
                }
            })?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn get_goal(&self, user_id: UserId, name: &str) -> StoreResult<Option<GoalRecord>> {
        get_goal(&self.tx, user_id, name)
    }

    /// Add `amount` to the saved total and return the new total.
    pub fn add_to_goal(&self, user_id: UserId, name: &str, amount: f64) -> StoreResult<f64> {
        self.tx
            .query_row(
                "UPDATE goals SET saved = saved + ?1
                 WHERE user_id = ?2 AND name = ?3 RETURNING saved",
                params![amount, user_id, name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NoSuchGoal { name: name.to_string() })
    }

    pub fn mark_bonus_paid(&self, goal_id: GoalId) -> StoreResult<()> {
        self.tx.execute(
            "UPDATE goals SET bonus_paid = 1 WHERE goal_id = ?1",
            params![goal_id],
        )?;
        Ok(())
    }
}

impl FinnyStore {
    pub fn create_goal(
        &self,
        user_id: UserId,
        name: &str,
        target: f64,
        initial_saved: f64,
    ) -> StoreResult<GoalId> {
        self.write(|tx| tx.create_goal(user_id, name, target, initial_saved))
    }

    pub fn get_goal(&self, user_id: UserId, name: &str) -> StoreResult<Option<GoalRecord>> {
        self.read(|conn| get_goal(conn, user_id, name))
    }

    pub fn add_to_goal(&self, user_id: UserId, name: &str, amount: f64) -> StoreResult<f64> {
        self.write(|tx| tx.add_to_goal(user_id, name, amount))
    }

    /// All goals for the user in creation order.
    pub fn list_goals(&self, user_id: UserId) -> StoreResult<Vec<GoalRecord>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ?1 ORDER BY goal_id ASC"
            ))?;
            let rows = stmt.query_map(params![user_id], goal_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }
}
