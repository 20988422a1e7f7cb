//! OpenAI-compatible chat generation model.
//!
//! This module is only available when the `openai` feature is enabled.
//! [`OpenAIChatModel`] calls any `/chat/completions`-compatible endpoint
//! with `reqwest`; the defaults target the DeepSeek deployment the knowledge
//! assistant runs against, and the base URL is configurable for OpenAI,
//! OpenRouter, or self-hosted servers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::generation::GenerationModel;

/// The default chat completions base URL.
const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// The default chat model.
const DEFAULT_MODEL: &str = "deepseek-chat";

/// A [`GenerationModel`] backed by an OpenAI-compatible chat completions API.
///
/// Requests are single-turn (one system plus one user message) at
/// temperature 0, the lowest-variance setting, so expansion and synthesis
/// are reproducible for a given prompt.
///
/// # Example
///
/// ```rust,ignore
/// use tactics_rag::openai::OpenAIChatModel;
///
/// let model = OpenAIChatModel::new("sk-...")?
///     .with_base_url("https://api.openai.com")
///     .with_model("gpt-4o-mini");
/// let answer = model.generate("system instruction", "user question").await?;
/// ```
pub struct OpenAIChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIChatModel {
    /// Create a new model handle with the given API key and defaults
    /// (`deepseek-chat` against `api.deepseek.com`).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("chat API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
        })
    }

    /// Create a new model handle using the `OPEN_ROUTER_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPEN_ROUTER_API_KEY").map_err(|_| {
            RagError::ConfigError("OPEN_ROUTER_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Set the API base URL (without the `/chat/completions` suffix).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

// ── Chat completions request/response types ────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl GenerationModel for OpenAIChatModel {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        debug!(
            provider = "OpenAI",
            model = %self.model,
            user_prompt_len = user_prompt.len(),
            "chat completion request"
        );

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "request failed");
                RagError::GenerationError {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "OpenAI", %status, "API error");
            return Err(RagError::GenerationError {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse response");
            RagError::GenerationError {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            RagError::GenerationError {
                provider: "OpenAI".into(),
                message: "API returned no choices".into(),
            }
        })
    }
}
