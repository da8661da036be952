use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.perplexity.ai/chat/completions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Upper bound for one dilemma request, connection included.
    pub timeout_ms: u64,
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "sonar".to_string(),
            max_tokens: 300,
            temperature: Some(0.9),
            timeout_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl AdvisorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: "sonar".to_string(),
            max_tokens: 150,
            timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Rows returned by the history command when no limit is given.
    pub history_limit: u32,
    /// How long an unanswered round stays playable.
    pub round_ttl_secs: u64,
}

impl GameConfig {
    pub fn round_ttl(&self) -> Duration {
        Duration::from_secs(self.round_ttl_secs)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,
            round_ttl_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinnyConfig {
    pub completion: CompletionConfig,
    pub advisor: AdvisorConfig,
    pub game: GameConfig,
}

impl FinnyConfig {
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/finny.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: FinnyConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {path}: {e}"))?;
        Ok(config)
    }
}
