//! Command abstractions.

use crate::artifact::ArtifactKindId;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> &str;
}

/// Builds the `<kind>.<action>` command type name for a kind-generic command.
#[must_use]
pub const fn command_type_for(kind: ArtifactKindId, action: CommandAction) -> &'static str {
    match (kind, action) {
        (ArtifactKindId::StoryRoot, CommandAction::Commit) => "story_root.commit",
        (ArtifactKindId::StoryRoot, CommandAction::ProposeMerge) => "story_root.propose_merge",
        (ArtifactKindId::WorldState, CommandAction::Commit) => "world_state.commit",
        (ArtifactKindId::WorldState, CommandAction::ProposeMerge) => "world_state.propose_merge",
    }
}

/// The actions a caller can take on an artifact chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    /// Append a new version and advance the current pointer.
    Commit,
    /// Ask the completion engine for a candidate artifact.
    ProposeMerge,
}
