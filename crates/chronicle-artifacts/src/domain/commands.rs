//! Commands for the artifacts context.

use chronicle_core::artifact::ArtifactKind;
use chronicle_core::command::{Command, CommandAction, command_type_for};
use chronicle_core::context::RequestContext;

/// Command to append a new version of an artifact and make it current.
#[derive(Debug, Clone)]
pub struct CommitArtifact<K> {
    /// Caller identity, correlation token and environment.
    pub context: RequestContext,
    /// The artifact to commit.
    pub artifact: K,
    /// Version the caller believes is current. `None` (or blank) commits
    /// unconditionally.
    pub expected_version_id: Option<String>,
}

impl<K: ArtifactKind> Command for CommitArtifact<K> {
    fn command_type(&self) -> &'static str {
        command_type_for(K::KIND, CommandAction::Commit)
    }

    fn correlation_id(&self) -> &str {
        self.context.correlation_id()
    }
}

impl<K> CommitArtifact<K> {
    /// The expected version id, treating a blank token as absent.
    #[must_use]
    pub fn expected_version(&self) -> Option<&str> {
        self.expected_version_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
