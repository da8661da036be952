use std::time::Duration;
use thiserror::Error;

// ── Store ──────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("You already have a goal named '{name}'")]
    DuplicateGoal { name: String },

    #[error("No goal named '{name}'")]
    NoSuchGoal { name: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

// ── Ledger ─────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Store failure: {0}")]
    StoreFailure(#[from] StoreError),
}

// ── Goals ──────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Goal target must be greater than zero (got {target})")]
    InvalidTarget { target: f64 },

    #[error("Amount must be a finite number (got {amount})")]
    InvalidAmount { amount: f64 },

    #[error("You already have a goal named '{name}'")]
    DuplicateGoal { name: String },

    #[error("No goal named '{name}'")]
    NoSuchGoal { name: String },

    #[error("Store failure: {0}")]
    StoreFailure(StoreError),
}

impl From<StoreError> for GoalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateGoal { name } => GoalError::DuplicateGoal { name },
            StoreError::NoSuchGoal { name } => GoalError::NoSuchGoal { name },
            other => GoalError::StoreFailure(other),
        }
    }
}

// ── Dilemma fetch ──────────────────────────────────────────────

/// Why a completion body could not be turned into a dilemma.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no JSON object found in completion")]
    NoObject,

    #[error("malformed JSON object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}' has the wrong type")]
    InvalidField { field: &'static str },
}

/// Upstream failures. Never surfaced to users; the fetcher falls back instead.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream returned no choices")]
    EmptyResponse,

    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    #[error("unusable payload: {0}")]
    Extract(#[from] ExtractError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Unavailable(err.to_string())
    }
}

// ── Bot façade ─────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum BotError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Goal(#[from] GoalError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("That round is over. Start a new one with /spendgame")]
    UnknownRound { round_id: String },
}

pub const TRY_AGAIN_MESSAGE: &str = "⚠️ Something went wrong on our side. Please try again.";

impl BotError {
    /// Text shown to the user. Store failures are generic; everything else is
    /// user-correctable and shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            BotError::Ledger(LedgerError::StoreFailure(_))
            | BotError::Goal(GoalError::StoreFailure(_))
            | BotError::Store(_) => TRY_AGAIN_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
