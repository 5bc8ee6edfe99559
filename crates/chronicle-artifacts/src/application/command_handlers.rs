//! Command handlers for the artifacts context.
//!
//! The commit handler implements the optimistic-concurrency protocol:
//! validate, read the chain, compare against the caller's expected version,
//! then append. When an expected version is supplied the current pointer
//! must name it too, and the pointer write is conditional on the pointer's
//! entity tag as read, so a commit that lands anywhere between the chain
//! read and the write is detected instead of overwritten.

use chronicle_core::artifact::ArtifactKind;
use chronicle_core::command::Command;
use chronicle_core::error::DomainError;
use chronicle_core::paths;
use chronicle_core::storage::{BlobError, Precondition, StorageError};
use chronicle_core::validation::validate;
use chronicle_core::version::VersionMetadata;
use tracing::{info, instrument, warn};

use crate::domain::commands::CommitArtifact;
use crate::store::{ArtifactStore, NewVersion};

/// Handles the `CommitArtifact` command: validates the artifact, checks the
/// expected version against the chain, and appends a new version with
/// `prior_version_id` set to the version that was current.
///
/// Returns the metadata of the new version.
///
/// # Errors
///
/// Returns `DomainError::Validation` (before any I/O) if a required field is
/// blank, `DomainError::Conflict` unless both the chain head and the current
/// pointer name the expected version until the write lands, and
/// `DomainError::Storage` on any storage failure.
#[instrument(
    skip_all,
    fields(
        command_type = command.command_type(),
        correlation_id = command.correlation_id(),
        user_id = command.context.user_id(),
    )
)]
pub async fn handle_commit_artifact<K: ArtifactKind>(
    command: &CommitArtifact<K>,
    store: &ArtifactStore<K>,
) -> Result<VersionMetadata, DomainError> {
    validate(&command.artifact)?;

    let user_id = command.context.user_id();
    let versions = store.list_versions(user_id).await?;
    let current_id = versions.into_iter().next().map(|m| m.version_id);

    let pointer_precondition = match command.expected_version() {
        Some(expected) => {
            if current_id.as_deref() != Some(expected) {
                warn!(expected, actual = ?current_id, "commit rejected: stale expected version");
                return Err(DomainError::Conflict {
                    expected: expected.to_owned(),
                    actual: current_id,
                });
            }
            // The pointer must still name the expected version; its tag
            // then guards the write below.
            match store.read_pointer(user_id).await? {
                Some((pointer, etag)) if pointer.version_id == expected => {
                    Precondition::IfMatch(etag)
                }
                pointer => {
                    let actual = pointer.map(|(pointer, _)| pointer.version_id);
                    warn!(expected, ?actual, "commit rejected: current pointer moved");
                    return Err(DomainError::Conflict {
                        expected: expected.to_owned(),
                        actual,
                    });
                }
            }
        }
        None => Precondition::None,
    };

    let saved = store
        .save_new_version(NewVersion {
            user_id,
            artifact: &command.artifact,
            prior_version_id: current_id.clone(),
            source_request_id: Some(command.context.correlation_id().to_owned()),
            environment: command.context.environment().map(str::to_owned),
            llm_assisted: true,
            pointer_precondition,
        })
        .await;

    match saved {
        Ok(metadata) => {
            info!(
                version_id = %metadata.version_id,
                prior_version_id = ?metadata.prior_version_id,
                "artifact committed"
            );
            Ok(metadata)
        }
        Err(StorageError::Blob(BlobError::PreconditionFailed { path }))
            if path == paths::current_path(user_id, K::KIND) =>
        {
            let actual = store
                .read_pointer(user_id)
                .await?
                .map(|(pointer, _)| pointer.version_id);
            let expected = command.expected_version().unwrap_or_default().to_owned();
            warn!(%expected, ?actual, "commit rejected: current pointer moved");
            Err(DomainError::Conflict { expected, actual })
        }
        Err(e) => Err(e.into()),
    }
}
