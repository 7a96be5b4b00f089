//! docqa-llm
//!
//! Chat-completion client for Groq's OpenAI-compatible API. `generate` turns
//! retrieved chunks plus a question into one prompt and returns the model's
//! text; every failure comes back as an [`LlmError`].

use async_trait::async_trait;
use std::time::Duration;

use docqa_core::config::Config;
use docqa_core::traits::Generator;
use docqa_core::types::SearchResult;

pub mod error;
pub mod prompt;
pub mod wire;

pub use error::LlmError;
pub use prompt::{build_prompt, NO_CONTEXT_ANSWER};

use error::truncate_for_error;
use wire::{ChatMessage, ChatRequest, ChatResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `llm.*` settings; the key comes from `GROQ_API_KEY`.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let api_key = config.groq_api_key().map_err(|e| LlmError::Config(e.to_string()))?;
        Ok(Self {
            base_url: config.get_or("llm.base_url", DEFAULT_BASE_URL.to_string()),
            api_key,
            model: config.get_or("llm.model", DEFAULT_MODEL.to_string()),
            max_tokens: config.get_or("llm.max_tokens", DEFAULT_MAX_TOKENS),
            temperature: config.get_or("llm.temperature", DEFAULT_TEMPERATURE),
            timeout: Duration::from_secs(config.get_or("llm.timeout_secs", DEFAULT_TIMEOUT_SECS)),
        })
    }
}

pub struct GroqClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl GroqClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { http, settings })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Self::new(LlmSettings::from_config(config)?)
    }

    fn completion_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    /// Send a single user message and return the trimmed reply.
    pub async fn complete(
        &self,
        content: &str,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String, LlmError> {
        let url = self.completion_url();
        let req = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage::user(content)],
            max_tokens,
            temperature,
        };
        tracing::debug!(%url, model = %self.settings.model, max_tokens, "sending chat completion");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .header("Accept", "application/json")
            .json(&req)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        match status {
            200..=299 => parse_completion(&body),
            401 | 403 => Err(LlmError::Authentication),
            429 => Err(LlmError::RateLimited),
            _ => Err(LlmError::Api { status, message: truncate_for_error(&body, 2_000) }),
        }
    }
}

/// Extract the first choice's message content from a completion body.
/// Providers sometimes put `{ "error": ... }` inside a 200 body; that is surfaced
/// as [`LlmError::Api`].
pub fn parse_completion(body: &str) -> Result<String, LlmError> {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(err) = v.get("error") {
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown provider error")
                .to_string();
            let status = err
                .get("status")
                .and_then(serde_json::Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .unwrap_or(200);
            return Err(LlmError::Api { status, message });
        }
    }
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Deserialization(format!("{e}: {}", truncate_for_error(body, 500))))?;
    parsed
        .choices
        .into_iter()
        .find_map(|c| c.message.and_then(|m| m.content))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(LlmError::EmptyResponse)
}

#[async_trait]
impl Generator for GroqClient {
    type Error = LlmError;

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn generate(&self, question: &str, context: &[SearchResult]) -> Result<String, LlmError> {
        if context.is_empty() {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }
        let prompt = build_prompt(question, context);
        self.complete(&prompt, self.settings.max_tokens, Some(self.settings.temperature)).await
    }

    async fn test_connection(&self) -> bool {
        match self.complete("Hello", 10, None).await {
            Ok(_) | Err(LlmError::EmptyResponse) => true,
            Err(e) => {
                tracing::warn!(error = %e, "LLM connection check failed");
                false
            }
        }
    }
}
