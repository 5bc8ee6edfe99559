//! Proposal values.

use std::collections::HashMap;

use chronicle_core::artifact::ArtifactKindId;
use serde::Serialize;

/// Variable holding the author's free-form input in every template.
pub const USER_INPUT_VARIABLE: &str = "user_input";

/// What the completion engine is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Build a first artifact from scratch.
    Create,
    /// Fold new input into an existing artifact.
    Merge,
}

impl Operation {
    /// `Create` when nothing is current yet, `Merge` otherwise.
    #[must_use]
    pub const fn for_current(has_current: bool) -> Self {
        if has_current { Self::Merge } else { Self::Create }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Merge => "merge",
        }
    }
}

/// Template id for `operation` on `kind`, e.g. `story-root-merge`.
#[must_use]
pub fn template_id(kind: ArtifactKindId, operation: Operation) -> String {
    format!("{}-{}", kind.kind_segment(), operation.suffix())
}

/// Variable holding the current artifact's JSON in merge templates, e.g.
/// `current_story_root`.
#[must_use]
pub fn current_variable(kind: ArtifactKindId) -> String {
    format!("current_{}", kind.document_key())
}

/// Output of the prepare phase: which template to fill and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptInput {
    /// Selected operation.
    pub operation: Operation,
    /// Template to load.
    pub template_id: String,
    /// Placeholder values.
    pub variables: HashMap<String, String>,
}

/// A validated candidate artifact next to the artifact it would replace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposal<K> {
    /// The candidate. Not persisted.
    pub proposal: K,
    /// The current artifact, if any, for side-by-side review.
    pub current: Option<K>,
}
