//! HTTP clients for external completion providers.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::core::config::ProviderSettings;
use crate::engine::core::errors::{EngineError, EngineResult};
use crate::engine::providers::registry::{ProviderConfig, ProviderKind};

/// Errors from a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, connection reset, body decode).
    #[error("provider transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("provider returned status {0}")]
    Status(u16),
    /// The call did not finish within the configured bound.
    #[error("provider call timed out")]
    Timeout,
    /// The body parsed but held no usable answer.
    #[error("provider response malformed: {0}")]
    Malformed(String),
    /// The provider has no API key.
    #[error("no API key configured for provider {0}")]
    MissingApiKey(String),
}

impl ProviderError {
    /// Stable code reported in response metadata.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "provider_transport",
            Self::Status(_) => "provider_status",
            Self::Timeout => "provider_timeout",
            Self::Malformed(_) => "provider_malformed",
            Self::MissingApiKey(_) => "provider_missing_key",
        }
    }
}

/// Prompt and sampling parameters for one call.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    /// System instructions.
    pub system: String,
    /// User turn.
    pub prompt: String,
    /// Token budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Boxed future type for completion calls.
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;

/// Trait abstraction over completion backends.
pub trait CompletionBackend: Send + Sync {
    /// Run one completion against `provider`.
    ///
    /// # Errors
    /// Returns an error if the call fails or yields no text.
    fn complete<'a>(
        &'a self,
        provider: &'a ProviderConfig,
        request: &'a CompletionRequest,
    ) -> CompletionFuture<'a>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// reqwest-backed client speaking the OpenAI-compatible and Ollama APIs.
#[derive(Clone)]
pub struct HttpCompletionBackend {
    client: reqwest::Client,
}

impl HttpCompletionBackend {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &ProviderSettings) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| EngineError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    async fn chat_completion(
        &self,
        provider: &ProviderConfig,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError> {
        let key = provider
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingApiKey(provider.name.clone()))?;
        let body = ChatCompletionRequest {
            model: &provider.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = endpoint(&provider.base_url, "chat/completions");
        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .and_then(non_empty)
            .ok_or_else(|| ProviderError::Malformed("no choices with content".to_string()))
    }

    async fn generate(
        &self,
        provider: &ProviderConfig,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            model: &provider.model,
            system: &request.system,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let url = endpoint(&provider.base_url, "api/generate");
        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = provider.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .response
            .and_then(non_empty)
            .ok_or_else(|| ProviderError::Malformed("empty generation".to_string()))
    }
}

impl CompletionBackend for HttpCompletionBackend {
    fn complete<'a>(
        &'a self,
        provider: &'a ProviderConfig,
        request: &'a CompletionRequest,
    ) -> CompletionFuture<'a> {
        Box::pin(async move {
            match provider.kind {
                ProviderKind::OpenAiCompatible => self.chat_completion(provider, request).await,
                ProviderKind::Ollama => self.generate(provider, request).await,
            }
        })
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
