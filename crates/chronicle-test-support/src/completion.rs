//! Test completion engines.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chronicle_core::completion::{CompletionEngine, CompletionError};

/// A completion engine that replays queued results and records every prompt
/// it receives.
#[derive(Debug, Default)]
pub struct ScriptedCompletionEngine {
    results: Mutex<VecDeque<Result<String, CompletionError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletionEngine {
    /// Create an engine that answers successive calls with `responses`.
    #[must_use]
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(responses.into_iter().map(|r| Ok(r.into())))
    }

    /// Create an engine that answers successive calls with `results`.
    #[must_use]
    pub fn with_results(
        results: impl IntoIterator<Item = Result<String, CompletionError>>,
    ) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt received, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionEngine for ScriptedCompletionEngine {
    async fn invoke(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.results.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(CompletionError::MalformedResponse(
                "no scripted response left".into(),
            ))
        })
    }
}

/// A completion engine that fails every call with the same kind of error.
#[derive(Debug)]
pub struct FailingCompletionEngine {
    make_error: fn() -> CompletionError,
}

impl FailingCompletionEngine {
    /// Fails with `CompletionError::Authentication`.
    #[must_use]
    pub fn authentication() -> Self {
        Self {
            make_error: || CompletionError::Authentication("invalid api key".into()),
        }
    }

    /// Fails with `CompletionError::RateLimited`, suggesting a 30 second wait.
    #[must_use]
    pub fn rate_limited() -> Self {
        Self {
            make_error: || CompletionError::RateLimited {
                retry_after_secs: Some(30),
            },
        }
    }

    /// Fails with `CompletionError::Network`.
    #[must_use]
    pub fn network() -> Self {
        Self {
            make_error: || CompletionError::Network("connection reset".into()),
        }
    }
}

#[async_trait]
impl CompletionEngine for FailingCompletionEngine {
    async fn invoke(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err((self.make_error)())
    }
}
