//! OpenAI-compatible chat client.
//!
//! Each call is a single request: no retries, no caching. Transport and
//! non-2xx failures surface as [`ToolbuilderError::RemoteService`]; a body
//! without `choices[0].message.content` surfaces as
//! [`ToolbuilderError::MalformedResponse`] carrying the raw payload.

use crate::config::LlmConfig;
use crate::error::{Result, ToolbuilderError};
use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Message role in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Response from chat completion. Every field is optional so that shape
/// problems are reported as malformed responses rather than serde errors.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Anything that can answer a (system, user) message pair.
///
/// The orchestrator and solver only depend on this trait, so tests can
/// substitute scripted backends for the HTTP client.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one system/user pair and return the first choice's text.
    async fn send(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier used for requests.
    fn model_name(&self) -> &str;
}

/// Extract `choices[0].message.content` from a raw response body.
pub fn extract_answer(body: &str) -> Result<String> {
    let completion: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|_| ToolbuilderError::malformed(body))?;

    if let Some(usage) = &completion.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "token usage"
        );
    }

    completion
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| ToolbuilderError::malformed(body))
}

/// OpenAI-compatible LLM client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    ///
    /// The API key is taken from `config`; nothing is read from the
    /// environment here.
    pub fn new(config: LlmConfig) -> Result<Self> {
        Self::with_builder(config, Client::builder())
    }

    fn with_builder(config: LlmConfig, builder: reqwest::ClientBuilder) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| ToolbuilderError::Config(format!("invalid API key header: {e}")))?;
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = builder
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        info!(
            model = %config.model,
            api_base = %config.api_base,
            timeout_secs = config.timeout_secs,
            "LlmClient initialized"
        );

        Ok(Self { client, config })
    }

    /// Get the API endpoint URL.
    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/v1/chat/completions", base)
    }

    /// Send a chat completion request and return the first choice's text.
    pub async fn chat(&self, messages: Vec<Message>) -> Result<String> {
        let started = Instant::now();
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let url = self.endpoint();
        debug!(model = %self.config.model, messages = request.messages.len(), "POST {}", url);

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                %status,
                %url,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned non-success status"
            );
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(ToolbuilderError::RemoteService(format!(
                    "API error ({}): {}",
                    status, api_error.error.message
                )));
            }
            return Err(ToolbuilderError::RemoteService(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        let content = extract_answer(&body)?;

        info!(
            model = %self.config.model,
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(content)
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn send(&self, system: &str, user: &str) -> Result<String> {
        self.chat(vec![Message::system(system), Message::user(user)])
            .await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
