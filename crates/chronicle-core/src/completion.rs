//! Completion engine abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a completion engine.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Credentials were rejected.
    #[error("completion engine authentication failed: {0}")]
    Authentication(String),

    /// The engine is throttling this caller.
    #[error("completion engine rate limit exceeded{}", retry_hint(*retry_after_secs))]
    RateLimited {
        /// Server-suggested wait, if one was sent.
        retry_after_secs: Option<u64>,
    },

    /// The request never produced an HTTP response.
    #[error("completion engine unreachable: {0}")]
    Network(String),

    /// The engine answered with a non-success status.
    #[error("completion engine returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The transport response did not have the expected shape.
    #[error("malformed completion engine response: {0}")]
    MalformedResponse(String),

    /// The engine is not usable as configured.
    #[error("completion engine misconfigured: {0}")]
    Configuration(String),

    /// The prompt was blank; nothing was sent.
    #[error("completion prompt must not be empty")]
    EmptyPrompt,
}

fn retry_hint(retry_after_secs: Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

/// External text-generation collaborator.
///
/// Invoked exactly once per proposal; implementations perform no semantic
/// interpretation of prompt or response and never retry.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Sends `prompt` and returns the raw completion text.
    async fn invoke(&self, prompt: &str) -> Result<String, CompletionError>;
}
