//! Goal core: named savings targets and their one-time completion bonus.
//!
//! RULE: a goal pays its bonus at most once, on the update that first moves
//! `saved` from below `target` to at-or-above it. The bonus goes through the
//! ledger primitive in the same store transaction as the saved-amount change.

use crate::{
    error::GoalError,
    ledger,
    store::{FinnyStore, GoalRecord},
    types::{GoalId, TxKind, UserId, COMPLETION_BONUS_RATE},
};
use serde::Serialize;
use std::sync::Arc;

/// Result of applying savings to a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub name: String,
    pub target: f64,
    pub saved: f64,
    /// `saved / target`, unbounded above 1.0.
    pub ratio: f64,
    pub completed: bool,
    /// FinCoins credited by this update, if it completed the goal.
    pub bonus_awarded: Option<i64>,
    /// Balance after the bonus, when one was paid.
    pub new_balance: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalView {
    pub name: String,
    pub target: f64,
    pub saved: f64,
    pub ratio: f64,
}

impl From<GoalRecord> for GoalView {
    fn from(g: GoalRecord) -> Self {
        let ratio = progress_ratio(g.saved, g.target);
        Self {
            name: g.name,
            target: g.target,
            saved: g.saved,
            ratio,
        }
    }
}

pub fn progress_ratio(saved: f64, target: f64) -> f64 {
    saved / target
}

/// Bonus for completing a goal of `target`, rounded to whole FinCoins.
pub fn completion_bonus(target: f64) -> i64 {
    (target * COMPLETION_BONUS_RATE).round() as i64
}

/// Largest accepted target. Keeps the bonus, and the balance it lands in,
/// well inside `i64`.
pub const MAX_GOAL_TARGET: f64 = 1e15;

pub struct GoalTracker {
    store: Arc<FinnyStore>,
}

impl GoalTracker {
    pub fn new(store: Arc<FinnyStore>) -> Self {
        Self { store }
    }

    pub fn set_goal(
        &self,
        user_id: UserId,
        display_name: &str,
        name: &str,
        target: f64,
        initial: f64,
    ) -> Result<GoalId, GoalError> {
        // Also rejects NaN.
        if !(target > 0.0 && target <= MAX_GOAL_TARGET) {
            return Err(GoalError::InvalidTarget { target });
        }
        if !initial.is_finite() {
            return Err(GoalError::InvalidAmount { amount: initial });
        }

        let goal_id = self.store.write(|tx| {
            tx.ensure_user(user_id, display_name)?;
            let goal_id = tx.create_goal(user_id, name, target, initial)?;
            // Starting complete forfeits the bonus for good.
            if initial >= target {
                tx.mark_bonus_paid(goal_id)?;
            }
            Ok::<_, GoalError>(goal_id)
        })?;
        log::debug!("user={user_id} goal '{name}' set target={target} initial={initial}");
        Ok(goal_id)
    }

    pub fn update_goal(
        &self,
        user_id: UserId,
        name: &str,
        amount: f64,
    ) -> Result<GoalProgress, GoalError> {
        if !amount.is_finite() {
            return Err(GoalError::InvalidAmount { amount });
        }

        let progress = self.store.write(|tx| {
            let goal = tx
                .get_goal(user_id, name)?
                .ok_or_else(|| GoalError::NoSuchGoal { name: name.to_string() })?;

            let saved = tx.add_to_goal(user_id, name, amount)?;
            let completed = saved >= goal.target;
            let crossed = completed && goal.saved < goal.target && !goal.bonus_paid;

            let bonus = completion_bonus(goal.target);
            if crossed {
                tx.mark_bonus_paid(goal.goal_id)?;
            }
            // Targets under 5 round to a zero bonus; no ledger row for those.
            let (bonus_awarded, new_balance) = if crossed && bonus > 0 {
                let description = format!("Goal completed: {name}");
                let balance = ledger::apply_in(tx, user_id, bonus, TxKind::Save, &description)?;
                (Some(bonus), Some(balance))
            } else {
                (None, None)
            };

            Ok::<_, GoalError>(GoalProgress {
                name: goal.name,
                target: goal.target,
                saved,
                ratio: progress_ratio(saved, goal.target),
                completed,
                bonus_awarded,
                new_balance,
            })
        })?;

        if let Some(bonus) = progress.bonus_awarded {
            log::info!("user={user_id} completed goal '{name}', bonus={bonus}");
        }
        Ok(progress)
    }

    /// Goals in creation order.
    pub fn list_goals(&self, user_id: UserId) -> Result<Vec<GoalView>, GoalError> {
        let goals = self.store.list_goals(user_id)?;
        Ok(goals.into_iter().map(GoalView::from).collect())
    }
}
