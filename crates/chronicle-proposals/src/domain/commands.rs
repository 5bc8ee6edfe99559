//! Commands for the proposals context.

use std::marker::PhantomData;

use chronicle_core::artifact::ArtifactKind;
use chronicle_core::command::{Command, CommandAction, command_type_for};
use chronicle_core::context::RequestContext;

/// Command to ask the completion engine for a merge proposal.
#[derive(Debug, Clone)]
pub struct ProposeMerge<K> {
    /// Caller identity and correlation token.
    pub context: RequestContext,
    /// The author's free-form input.
    pub raw_input: String,
    kind: PhantomData<fn() -> K>,
}

impl<K> ProposeMerge<K> {
    /// Creates the command.
    #[must_use]
    pub fn new(context: RequestContext, raw_input: impl Into<String>) -> Self {
        Self {
            context,
            raw_input: raw_input.into(),
            kind: PhantomData,
        }
    }
}

impl<K: ArtifactKind> Command for ProposeMerge<K> {
    fn command_type(&self) -> &'static str {
        command_type_for(K::KIND, CommandAction::ProposeMerge)
    }

    fn correlation_id(&self) -> &str {
        self.context.correlation_id()
    }
}
