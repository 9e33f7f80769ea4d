//! OpenRouter reasoning-provider client
//!
//! Every pipeline stage talks to the provider through this one code path:
//! near-deterministic sampling (temperature 0.2), JSON-only replies enforced
//! by the instructions plus parse-and-retry, and backoff on rate limits.
//! Callers always receive parsed JSON, never a raw string.

use async_trait::async_trait;
use cdis_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const TEMPERATURE: f64 = 0.2;
const MAX_ATTEMPTS: u32 = 5;
/// Wait schedule on 429 replies; the last entry repeats
const BACKOFF_SECONDS: [u64; 3] = [15, 30, 60];

/// One reasoning pass: structured instructions + JSON payload in, JSON out
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    async fn call(
        &self,
        instructions: &str,
        payload: &serde_json::Value,
        model: &str,
        max_output_tokens: u32,
    ) -> Result<serde_json::Value>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenRouterClient {
    /// `api_key: None` defers the failure to the first call, so the service
    /// can start (and serve the deterministic endpoints) without a key.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn key(&self) -> Result<&str> {
        match &self.api_key {
            Some(k) if cdis_common::config::is_valid_key(k) => Ok(k),
            _ => Err(Error::Config(
                "OpenRouter API key is not configured; set CDIS_OPENROUTER_API_KEY".to_string(),
            )),
        }
    }
}

/// Drop a leading/trailing markdown code fence if the reply carries one
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return trimmed,
    };
    inner.trim_end().strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait]
impl ReasoningProvider for OpenRouterClient {
    async fn call(
        &self,
        instructions: &str,
        payload: &serde_json::Value,
        model: &str,
        max_output_tokens: u32,
    ) -> Result<serde_json::Value> {
        let key = self.key()?;
        let user_prompt = payload.to_string();

        let request = ChatRequest {
            model,
            temperature: TEMPERATURE,
            max_tokens: max_output_tokens,
            messages: vec![
                ChatMessage { role: "system", content: instructions },
                ChatMessage { role: "user", content: &user_prompt },
            ],
        };

        let mut last_error = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            debug!(attempt, model, "reasoning call");
            let response = match self
                .client
                .post(&self.base_url)
                .bearer_auth(key)
                .json(&request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!(attempt, error = %e, "reasoning request failed");
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 {
                let idx = (attempt as usize - 1).min(BACKOFF_SECONDS.len() - 1);
                let wait = BACKOFF_SECONDS[idx];
                warn!(attempt, wait_seconds = wait, "rate limited by provider");
                last_error = "rate limited (HTTP 429)".to_string();
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                continue;
            }
            if !status.is_success() {
                return Err(Error::Unavailable(format!(
                    "reasoning provider returned HTTP {status}"
                )));
            }

            let body: ChatResponse = match response.json().await {
                Ok(b) => b,
                Err(e) => {
                    warn!(attempt, error = %e, "provider envelope malformed");
                    last_error = e.to_string();
                    continue;
                }
            };
            let content = body
                .choices
                .first()
                .map(|c| c.message.content.as_str())
                .unwrap_or_default();

            match serde_json::from_str(strip_code_fence(content)) {
                Ok(value) => {
                    debug!(attempt, "reasoning call succeeded");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "reply was not valid JSON");
                    last_error = format!("non-JSON reply: {e}");
                }
            }
        }

        Err(Error::UpstreamData(format!(
            "reasoning call failed after {MAX_ATTEMPTS} attempts: {last_error}"
        )))
    }
}
