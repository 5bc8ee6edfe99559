//! Domain error types.

use thiserror::Error;

use crate::completion::CompletionError;
use crate::storage::StorageError;
use crate::validation::ValidationFailure;

/// Top-level domain error type.
///
/// Every variant is terminal for the in-flight request except `Conflict`,
/// which callers are expected to handle by reloading the current version.
/// Nothing in this workspace retries on any of them.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Empty or malformed caller input. Raised before any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An artifact is missing one or more required fields.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// Optimistic concurrency conflict on the current pointer.
    #[error(
        "version conflict: expected version {expected} but current version is {}",
        actual.as_deref().unwrap_or("(none)")
    )]
    Conflict {
        /// The version the caller expected to be current.
        expected: String,
        /// The version actually current, or `None` for an empty chain.
        actual: Option<String>,
    },

    /// Object-store I/O or chain-integrity failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The completion engine failed.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// A prompt template referenced placeholders that had no value.
    #[error(
        "template {template_id} has unresolved placeholders: {}",
        missing.join(", ")
    )]
    Substitution {
        /// The template being assembled.
        template_id: String,
        /// Every unresolved placeholder name, in order of first appearance.
        missing: Vec<String>,
    },

    /// The completion response could not be read as an artifact.
    #[error("unparseable completion response: {reason}")]
    Parse {
        /// Why parsing failed.
        reason: String,
        /// The raw completion text, kept for debugging.
        raw_response: String,
    },

    /// The template provider has no template with this id.
    #[error("template not found: {0}")]
    TemplateNotFound(String),
}

impl DomainError {
    /// Returns the raw completion response carried by this error, if any.
    #[must_use]
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Parse { raw_response, .. } => Some(raw_response),
            Self::Validation(failure) => failure.raw_response.as_deref(),
            _ => None,
        }
    }
}
