//! Fixed-response engine for development.

use async_trait::async_trait;
use chronicle_core::completion::{CompletionEngine, CompletionError};
use tracing::debug;

/// Returns the same response for every prompt without calling anything.
#[derive(Debug, Clone)]
pub struct StaticCompletionEngine {
    response: String,
}

impl StaticCompletionEngine {
    /// Engine answering every prompt with `response`.
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl Default for StaticCompletionEngine {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl CompletionEngine for StaticCompletionEngine {
    async fn invoke(&self, prompt: &str) -> Result<String, CompletionError> {
        if prompt.trim().is_empty() {
            return Err(CompletionError::EmptyPrompt);
        }
        debug!(prompt_len = prompt.len(), "static completion");
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_configured_response() {
        let engine = StaticCompletionEngine::new(r#"{"genre":"noir"}"#);

        let response = engine.invoke("anything").await.unwrap();

        assert_eq!(response, r#"{"genre":"noir"}"#);
    }

    #[tokio::test]
    async fn test_default_response_is_empty_object() {
        assert_eq!(
            StaticCompletionEngine::default().invoke("x").await.unwrap(),
            "{}"
        );
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected() {
        let result = StaticCompletionEngine::default().invoke("  ").await;

        assert!(matches!(result, Err(CompletionError::EmptyPrompt)));
    }
}
