//! Shared primitive types used across the bot core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable user identity assigned by the chat platform.
pub type UserId = i64;

pub type GoalId = i64;

pub type TxId = i64;

/// Balance every user starts with on first touch. Mirrors the column default.
pub const STARTING_BALANCE: i64 = 100;

/// Share of a goal's target credited when the goal is completed.
pub const COMPLETION_BONUS_RATE: f64 = 0.1;

/// Which side of a dilemma a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Spend,
    Save,
}

impl TxKind {
    /// Value stored in the `transactions.type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            TxKind::Spend => "spend",
            TxKind::Save  => "save",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "spend" => Some(TxKind::Spend),
            "save"  => Some(TxKind::Save),
            _ => None,
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
