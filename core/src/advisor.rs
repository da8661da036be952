//! Free-form finance Q&A in Finny's voice.

use crate::{
    completion::{ChatMessage, CompletionClient, CompletionRequest},
    config::AdvisorConfig,
    error::FetchError,
};
use std::sync::Arc;

const PERSONA_PROMPT: &str = "You are Finny, a witty financial assistant for Gen Z. \
Respond in under 200 characters. Use emojis, analogies, and humor. \
Be concise but helpful.";

pub struct Advisor {
    client: Arc<dyn CompletionClient>,
    config: AdvisorConfig,
}

impl Advisor {
    pub fn new(client: Arc<dyn CompletionClient>, config: AdvisorConfig) -> Self {
        Self { client, config }
    }

    /// Answer `question`. Upstream failures become a short in-character
    /// message rather than an error.
    pub async fn ask(&self, question: &str) -> String {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(PERSONA_PROMPT), ChatMessage::user(question)],
            max_tokens: self.config.max_tokens,
            temperature: None,
        };

        let timeout = self.config.timeout();
        let answer = tokio::time::timeout(timeout, self.client.complete(&request))
            .await
            .unwrap_or(Err(FetchError::Timeout(timeout)));

        match answer {
            Ok(answer) => answer.trim().to_string(),
            Err(FetchError::Status { status, body }) => {
                log::warn!("Advisor upstream returned {status}");
                format!("❌ API Error ({status}): {body}")
            }
            Err(e) => {
                log::warn!("Advisor request failed: {e}");
                format!("⚠️ Finny glitched: {e}")
            }
        }
    }
}
