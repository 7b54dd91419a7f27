//! OpenAI-compatible chat completions client, pointed at OpenRouter by default.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LanguageModel;
use crate::{config::LlmConfig, error::CompletionError};

pub struct OpenRouterModel {
    /// Never exposed in logs or debug output.
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    http: Client,
}

impl std::fmt::Debug for OpenRouterModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterModel")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenRouterModel {
    pub fn new(api_key: String, api_base: String, model: String, temperature: f32) -> Self {
        Self {
            api_key: SecretString::from(api_key),
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            temperature,
            http: Client::new(),
        }
    }

    /// Build from config; `None` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;

        Some(Self::new(
            api_key,
            config.api_base.clone(),
            config.model.clone(),
            config.temperature,
        ))
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenRouterModel {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.api_base);
        let bearer = format!("Bearer {}", self.api_key.expose_secret());
        debug!(model = %self.model, "sending completion request");

        let res = self
            .http
            .post(&url)
            .header("Authorization", bearer)
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited(truncate_body(&body)));
        }

        if !status.is_success() {
            return Err(CompletionError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(CompletionError::Empty)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
