//! finny-runner: line-oriented bridge between a chat platform and the Finny core.
//!
//! Usage:
//!   finny-runner --db finny.db --data-dir ./data
//!   finny-runner --db finny.db --summary --user 12345
//!
//! In bridge mode every stdin line is one JSON command, e.g.
//!   {"user_id": 1, "username": "alice", "cmd": "start_game"}
//! and every reply is written as one JSON line on stdout.

use anyhow::Result;
use finny_core::{
    command::{BotReply, InboundCommand},
    completion::HttpCompletionClient,
    config::FinnyConfig,
    goals::{GoalTracker, GoalView},
    ledger::Ledger,
    store::FinnyStore,
    types::UserId,
    FinnyBot,
};
use std::env;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

const API_KEY_VAR: &str = "PERPLEXITY_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = arg_value(&args, "--db").unwrap_or("finny.db");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");
    let summary_mode = args.iter().any(|a| a == "--summary");

    let config = match FinnyConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; using built-in defaults");
            FinnyConfig::default()
        }
    };

    let store = Arc::new(FinnyStore::open(db)?);
    store.migrate()?;

    if summary_mode {
        let user_id: UserId = parse_arg(&args, "--user", 0);
        return print_summary(&store, &config, user_id);
    }

    let api_key = env::var(API_KEY_VAR).ok();
    if api_key.is_none() {
        log::warn!("{API_KEY_VAR} not set; dilemmas will use the fallback");
    }
    let client = Arc::new(HttpCompletionClient::new(&config.completion, api_key));
    let bot = FinnyBot::new(store, client, config);

    log::info!("finny-runner ready (db: {db})");
    run_bridge_loop(&bot).await
}

async fn run_bridge_loop(bot: &FinnyBot) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<InboundCommand>(&line) {
            Ok(inbound) => bot.handle(inbound).await,
            Err(e) => BotReply::Error { message: format!("Unreadable command: {e}") },
        };

        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

fn print_summary(store: &Arc<FinnyStore>, config: &FinnyConfig, user_id: UserId) -> Result<()> {
    let ledger = Ledger::new(store.clone());
    let goals = GoalTracker::new(store.clone());

    let name = store.get_username(user_id)?.unwrap_or_else(|| "(unknown)".to_string());
    let summary = ledger.summary(user_id)?;

    println!("=== FINNY SUMMARY ===");
    println!("  user:        {user_id} ({name})");
    println!("  fincoins:    {}", summary.balance);
    println!("  txns:        {}", summary.tx_count);
    println!("  net change:  {:+}", summary.net_change);
    if summary.drift != 0 {
        println!("  drift:       {:+} (balance not explained by log)", summary.drift);
    }

    println!();
    println!("=== GOALS ===");
    let goal_views = goals.list_goals(user_id)?;
    if goal_views.is_empty() {
        println!("  (No goals yet)");
    }
    for g in &goal_views {
        println!("  {}", render_goal(g));
    }

    println!();
    println!("=== RECENT TRANSACTIONS ===");
    for tx in ledger.history(user_id, config.game.history_limit)? {
        println!("  {} | {:>5} | {:+} | {}", tx.timestamp, tx.kind, tx.amount, tx.description);
    }
    Ok(())
}

/// `PS5: [#####-----] 50% (500/1000)`; the bar is capped, the percentage is not.
fn render_goal(g: &GoalView) -> String {
    const WIDTH: usize = 10;
    let filled = ((g.ratio.clamp(0.0, 1.0)) * WIDTH as f64).round() as usize;
    format!(
        "{}: [{}{}] {:.0}% ({:.0}/{:.0})",
        g.name,
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        g.ratio * 100.0,
        g.saved,
        g.target
    )
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
