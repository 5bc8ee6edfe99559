//! OpenAI-compatible chat completions client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chronicle_core::completion::{CompletionEngine, CompletionError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// Chat completions endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for [`OpenAiCompletionEngine`].
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Bearer token.
    pub api_key: String,
    /// Full URL of the chat completions endpoint.
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Whole-request timeout. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    /// Config for the public endpoint and default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: None,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Sends each prompt as a single user message and returns the first
/// choice's content.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionEngine {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiCompletionEngine {
    /// Builds an engine from `config`.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Configuration` if the API key, endpoint or
    /// model is blank, or the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        for (name, value) in [
            ("api key", &config.api_key),
            ("endpoint", &config.endpoint),
            ("model", &config.model),
        ] {
            if value.trim().is_empty() {
                return Err(CompletionError::Configuration(format!(
                    "OpenAI {name} is not configured"
                )));
            }
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CompletionError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }
}

fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

#[async_trait]
impl CompletionEngine for OpenAiCompletionEngine {
    #[instrument(skip_all, fields(model = %self.config.model, prompt_len = prompt.len()))]
    async fn invoke(&self, prompt: &str) -> Result<String, CompletionError> {
        if prompt.trim().is_empty() {
            return Err(CompletionError::EmptyPrompt);
        }

        let body = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion request failed");
                CompletionError::Network(e.to_string())
            })?;

        let status = response.status();
        info!(
            status = status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "completion request finished"
        );

        if status == StatusCode::UNAUTHORIZED {
            error!("completion engine rejected credentials");
            return Err(CompletionError::Authentication(
                "the API key was rejected".into(),
            ));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = retry_after_secs(&response);
            warn!(?retry_after_secs, "completion engine rate limited");
            return Err(CompletionError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "completion engine returned an error");
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(CompletionError::MalformedResponse(
                "response has no choices".into(),
            ));
        };

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            warn!("completion engine returned empty content");
            return Ok(String::new());
        }
        info!(response_len = content.len(), "completion received");
        Ok(content)
    }
}
