//! Command handlers for the proposals context.

use chronicle_artifacts::ArtifactStore;
use chronicle_core::artifact::ArtifactKind;
use chronicle_core::command::Command;
use chronicle_core::error::DomainError;
use tracing::{info, instrument};

use crate::application::pipeline::{ProposalPipeline, require_input};
use crate::domain::commands::ProposeMerge;
use crate::domain::proposal::Proposal;

/// Handles the `ProposeMerge` command: reads the caller's current artifact
/// and runs the proposal pipeline against it. Persists nothing.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` (before any I/O) for blank input,
/// `DomainError::Storage` if the current artifact cannot be read, and any
/// error the pipeline raises.
#[instrument(
    skip_all,
    fields(
        command_type = command.command_type(),
        correlation_id = command.correlation_id(),
        user_id = command.context.user_id(),
    )
)]
pub async fn handle_propose_merge<K: ArtifactKind>(
    command: &ProposeMerge<K>,
    store: &ArtifactStore<K>,
    pipeline: &ProposalPipeline<K>,
) -> Result<Proposal<K>, DomainError> {
    require_input(&command.raw_input)?;

    let current = store.get_current(command.context.user_id()).await?;
    let proposal = pipeline.propose(current, &command.raw_input).await?;

    info!(
        has_current = proposal.current.is_some(),
        "merge proposal ready for review"
    );
    Ok(proposal)
}
