use crate::{
    dilemma::Dilemma,
    goals::{GoalProgress, GoalView},
    ledger::LedgerSummary,
    store::TransactionRecord,
    types::{GoalId, TxKind, UserId},
};
use serde::{Deserialize, Serialize};

/// Commands the presentation layer forwards to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BotCommand {
    // ── Game ──────────────────────────────────────
    StartGame,
    Choose {
        round_id: String,
        kind: TxKind,
    },

    // ── Goals ─────────────────────────────────────
    SetGoal {
        name: String,
        target: f64,
        #[serde(default)]
        initial: f64,
    },
    UpdateGoal {
        name: String,
        amount: f64,
    },
    ListGoals,

    // ── Ledger reads ──────────────────────────────
    Balance,
    History {
        #[serde(default)]
        limit: Option<u32>,
    },

    // ── Chat ──────────────────────────────────────
    Ask {
        question: String,
    },
}

/// A command as it arrives from the platform, tagged with who sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundCommand {
    pub user_id: UserId,
    pub username: String,
    #[serde(flatten)]
    pub command: BotCommand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum BotReply {
    Round {
        round_id: String,
        dilemma: Dilemma,
    },
    Decision {
        kind: TxKind,
        points: i64,
        response: String,
        balance: i64,
    },
    GoalSet {
        goal_id: GoalId,
        name: String,
        target: f64,
    },
    GoalUpdated {
        progress: GoalProgress,
    },
    Goals {
        goals: Vec<GoalView>,
    },
    Balance {
        summary: LedgerSummary,
    },
    History {
        transactions: Vec<TransactionRecord>,
    },
    Answer {
        text: String,
    },
    Error {
        message: String,
    },
}
