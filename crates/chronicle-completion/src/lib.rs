//! Completion engine implementations.
//!
//! [`OpenAiCompletionEngine`] talks to any OpenAI-compatible chat
//! completions endpoint. [`StaticCompletionEngine`] answers every prompt with
//! the same configured text and is used in development.

mod fixed;
mod openai;

pub use fixed::StaticCompletionEngine;
pub use openai::{DEFAULT_ENDPOINT, DEFAULT_MODEL, OpenAiCompletionEngine, OpenAiConfig};
