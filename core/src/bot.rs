//! The bot façade: every inbound command enters the core through here.
//!
//! Store, ledger, goal tracker, fetcher and advisor are constructed once and
//! injected; nothing in the core is a global.

use crate::{
    advisor::Advisor,
    command::{BotCommand, BotReply, InboundCommand},
    completion::CompletionClient,
    config::FinnyConfig,
    dilemma::{Dilemma, DilemmaFetcher},
    error::BotError,
    goals::{GoalProgress, GoalTracker, GoalView},
    ledger::{Ledger, LedgerSummary},
    store::{FinnyStore, TransactionRecord},
    types::{GoalId, TxKind, UserId},
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use uuid::Uuid;

/// A dilemma handed to a user and waiting for their choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRound {
    pub round_id: String,
    pub dilemma: Dilemma,
}

/// The applied outcome of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionResult {
    pub kind: TxKind,
    pub points: i64,
    pub response: String,
    pub balance: i64,
}

pub struct FinnyBot {
    ledger: Ledger,
    goals: GoalTracker,
    fetcher: DilemmaFetcher,
    advisor: Advisor,
    config: FinnyConfig,
    rounds: Mutex<HashMap<String, (Instant, Dilemma)>>,
}

impl FinnyBot {
    pub fn new(
        store: Arc<FinnyStore>,
        client: Arc<dyn CompletionClient>,
        config: FinnyConfig,
    ) -> Self {
        Self {
            ledger: Ledger::new(store.clone()),
            goals: GoalTracker::new(store),
            fetcher: DilemmaFetcher::new(client.clone(), config.completion.clone()),
            advisor: Advisor::new(client, config.advisor.clone()),
            config,
            rounds: Mutex::new(HashMap::new()),
        }
    }

    // ── Game ──────────────────────────────────────────────────────

    /// Fetch a dilemma and open a round for it. Never fails.
    pub async fn start_game(&self) -> GameRound {
        let dilemma = self.fetcher.fetch_dilemma(self.fetcher.default_timeout()).await;
        let round_id = Uuid::new_v4().to_string();
        let ttl = self.config.game.round_ttl();
        let mut rounds = self.rounds_lock();
        rounds.retain(|_, (opened, _)| opened.elapsed() < ttl);
        rounds.insert(round_id.clone(), (Instant::now(), dilemma.clone()));
        drop(rounds);
        log::debug!("round {round_id} opened");
        GameRound { round_id, dilemma }
    }

    /// Resolve a round with the user's choice. Each round resolves once and
    /// expires after the configured round TTL.
    pub fn choose_outcome(
        &self,
        user_id: UserId,
        display_name: &str,
        round_id: &str,
        kind: TxKind,
    ) -> Result<DecisionResult, BotError> {
        let ttl = self.config.game.round_ttl();
        let (opened, dilemma) = self
            .rounds_lock()
            .remove(round_id)
            .filter(|(opened, _)| opened.elapsed() < ttl)
            .ok_or_else(|| BotError::UnknownRound { round_id: round_id.to_string() })?;

        let outcome = dilemma.outcome(kind);
        let balance = match self.ledger.apply_decision(
            user_id,
            display_name,
            outcome.points,
            kind,
            &dilemma.prompt,
        ) {
            Ok(balance) => balance,
            Err(e) => {
                // Nothing was applied, so the round stays playable.
                self.rounds_lock().insert(round_id.to_string(), (opened, dilemma));
                return Err(e.into());
            }
        };

        Ok(DecisionResult {
            kind,
            points: outcome.points,
            response: outcome.response.clone(),
            balance,
        })
    }

    /// Rounds started but not yet resolved.
    pub fn open_rounds(&self) -> usize {
        self.rounds_lock().len()
    }

    // ── Goals ─────────────────────────────────────────────────────

    pub fn set_goal(
        &self,
        user_id: UserId,
        display_name: &str,
        name: &str,
        target: f64,
        initial: f64,
    ) -> Result<GoalId, BotError> {
        Ok(self.goals.set_goal(user_id, display_name, name, target, initial)?)
    }

    pub fn update_goal(
        &self,
        user_id: UserId,
        name: &str,
        amount: f64,
    ) -> Result<GoalProgress, BotError> {
        Ok(self.goals.update_goal(user_id, name, amount)?)
    }

    pub fn list_goals(&self, user_id: UserId) -> Result<Vec<GoalView>, BotError> {
        Ok(self.goals.list_goals(user_id)?)
    }

    // ── Ledger reads ──────────────────────────────────────────────

    pub fn balance(&self, user_id: UserId) -> Result<LedgerSummary, BotError> {
        Ok(self.ledger.summary(user_id)?)
    }

    pub fn history(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<TransactionRecord>, BotError> {
        let limit = limit.unwrap_or(self.config.game.history_limit);
        Ok(self.ledger.history(user_id, limit)?)
    }

    // ── Chat ──────────────────────────────────────────────────────

    pub async fn ask(&self, question: &str) -> String {
        self.advisor.ask(question).await
    }

    // ── Dispatch ──────────────────────────────────────────────────

    /// Run one inbound command. Errors are folded into `BotReply::Error`
    /// with a user-facing message.
    pub async fn handle(&self, inbound: InboundCommand) -> BotReply {
        let InboundCommand { user_id, username, command } = inbound;
        let result = match command {
            BotCommand::StartGame => {
                let round = self.start_game().await;
                Ok(BotReply::Round { round_id: round.round_id, dilemma: round.dilemma })
            }
            BotCommand::Choose { round_id, kind } => self
                .choose_outcome(user_id, &username, &round_id, kind)
                .map(|d| BotReply::Decision {
                    kind: d.kind,
                    points: d.points,
                    response: d.response,
                    balance: d.balance,
                }),
            BotCommand::SetGoal { name, target, initial } => self
                .set_goal(user_id, &username, &name, target, initial)
                .map(|goal_id| BotReply::GoalSet { goal_id, name, target }),
            BotCommand::UpdateGoal { name, amount } => self
                .update_goal(user_id, &name, amount)
                .map(|progress| BotReply::GoalUpdated { progress }),
            BotCommand::ListGoals => self
                .list_goals(user_id)
                .map(|goals| BotReply::Goals { goals }),
            BotCommand::Balance => self
                .balance(user_id)
                .map(|summary| BotReply::Balance { summary }),
            BotCommand::History { limit } => self
                .history(user_id, limit)
                .map(|transactions| BotReply::History { transactions }),
            BotCommand::Ask { question } => Ok(BotReply::Answer {
                text: self.ask(&question).await,
            }),
        };

        result.unwrap_or_else(|e| {
            log::warn!("user={user_id} command failed: {e}");
            BotReply::Error { message: e.user_message() }
        })
    }

    fn rounds_lock(&self) -> MutexGuard<'_, HashMap<String, (Instant, Dilemma)>> {
        self.rounds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
