//! Dilemma fetcher: turns an unreliable completion endpoint into a valid
//! spend-or-save round, falling back to a fixed dilemma on any failure.

use crate::{
    completion::{ChatMessage, CompletionClient, CompletionRequest},
    config::CompletionConfig,
    error::{ExtractError, FetchError},
    types::TxKind,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are Finny, a witty money coach for Gen Z. \
Invent one everyday spend-or-save dilemma with prices in rupees (₹). \
Respond with RAW JSON only: no markdown, no code fences, no commentary. \
The JSON object must have exactly these fields: \
\"dilemma\" (string, under 150 characters, with emojis), \
\"spend_points\" (integer, negative, between -20 and -1), \
\"save_points\" (integer, positive, between 1 and 20), \
\"spend_response\" (string, a playful reaction to spending), \
\"save_response\" (string, a playful reaction to saving).";

const USER_PROMPT: &str = "Give me today's spend-or-save dilemma. \
Reply with only the JSON object and nothing else.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub points: i64,
    pub response: String,
}

/// One spend-vs-save scenario. Used by a single round, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dilemma {
    pub prompt: String,
    pub spend: Outcome,
    pub save: Outcome,
}

impl Dilemma {
    /// The fixed dilemma used whenever the upstream cannot provide one.
    pub fn fallback() -> Self {
        Self {
            prompt: "🍔 Order in (₹350) vs. cook ramen (₹50)... your stomach is growling. Spend or Save?"
                .to_string(),
            spend: Outcome {
                points: -10,
                response: "💸 Delivery fees ate your wallet. -10 FinCoins!".to_string(),
            },
            save: Outcome {
                points: 5,
                response: "🍜 Chef mode unlocked! +5 FinCoins.".to_string(),
            },
        }
    }

    pub fn outcome(&self, kind: TxKind) -> &Outcome {
        match kind {
            TxKind::Spend => &self.spend,
            TxKind::Save => &self.save,
        }
    }
}

/// Pull the outermost `{...}` out of `raw` and validate it as a dilemma.
///
/// Leading and trailing prose, markdown fences and the like are ignored.
pub fn extract_dilemma(raw: &str) -> Result<Dilemma, ExtractError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(ExtractError::NoObject);
    };
    if end < start {
        return Err(ExtractError::NoObject);
    }

    let value: Value = serde_json::from_str(&raw[start..=end])?;
    let obj = value.as_object().ok_or(ExtractError::NoObject)?;

    Ok(Dilemma {
        prompt: text_field(obj, "dilemma")?,
        spend: Outcome {
            points: points_field(obj, "spend_points")?,
            response: text_field(obj, "spend_response")?,
        },
        save: Outcome {
            points: points_field(obj, "save_points")?,
            response: text_field(obj, "save_response")?,
        },
    })
}

fn field<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, ExtractError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ExtractError::MissingField { field }),
        Some(v) => Ok(v),
    }
}

fn text_field(obj: &Map<String, Value>, name: &'static str) -> Result<String, ExtractError> {
    match field(obj, name)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ExtractError::InvalidField { field: name }),
    }
}

/// Integer points. Whole floats and integer strings are accepted too.
fn points_field(obj: &Map<String, Value>, name: &'static str) -> Result<i64, ExtractError> {
    let invalid = || ExtractError::InvalidField { field: name };
    match field(obj, name)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 1e15).map(|f| f as i64))
            .ok_or_else(invalid),
        Value::String(s) => s.trim().parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

pub struct DilemmaFetcher {
    client: Arc<dyn CompletionClient>,
    config: CompletionConfig,
}

impl DilemmaFetcher {
    pub fn new(client: Arc<dyn CompletionClient>, config: CompletionConfig) -> Self {
        Self { client, config }
    }

    /// Timeout from the configuration.
    pub fn default_timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Always returns a playable dilemma within roughly `timeout`.
    pub async fn fetch_dilemma(&self, timeout: Duration) -> Dilemma {
        match self.try_fetch(timeout).await {
            Ok(dilemma) => dilemma,
            Err(e) => {
                log::warn!("Dilemma fetch failed, using fallback: {e}");
                Dilemma::fallback()
            }
        }
    }

    /// One attempt, no retry. Each failure kind is reported separately.
    pub async fn try_fetch(&self, timeout: Duration) -> Result<Dilemma, FetchError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(USER_PROMPT)],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let raw = tokio::time::timeout(timeout, self.client.complete(&request))
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;

        Ok(extract_dilemma(&raw)?)
    }
}
