//! Query handlers for the artifacts context.

use chronicle_core::artifact::ArtifactKind;
use chronicle_core::context::RequestContext;
use chronicle_core::error::DomainError;
use chronicle_core::version::VersionMetadata;
use tracing::{info, instrument};

use crate::store::ArtifactStore;

/// Retrieves the caller's current artifact. `None` means nothing has been
/// committed yet.
///
/// # Errors
///
/// Returns `DomainError::Storage` on I/O failure or a dangling pointer.
#[instrument(skip_all, fields(kind = %K::KIND, user_id = context.user_id()))]
pub async fn get_current<K: ArtifactKind>(
    context: &RequestContext,
    store: &ArtifactStore<K>,
) -> Result<Option<K>, DomainError> {
    Ok(store.get_current(context.user_id()).await?)
}

/// Retrieves one version of the caller's artifact by id.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` for a blank version id and
/// `DomainError::Storage` on I/O failure.
#[instrument(
    skip_all,
    fields(kind = %K::KIND, user_id = context.user_id(), version_id = %version_id)
)]
pub async fn get_version<K: ArtifactKind>(
    context: &RequestContext,
    version_id: &str,
    store: &ArtifactStore<K>,
) -> Result<Option<K>, DomainError> {
    if version_id.trim().is_empty() {
        return Err(DomainError::InvalidInput(
            "version id must not be empty".into(),
        ));
    }
    Ok(store.get_version(context.user_id(), version_id).await?)
}

/// Lists the metadata of every version of the caller's artifact, newest
/// first.
///
/// # Errors
///
/// Returns `DomainError::Storage` on I/O failure.
#[instrument(skip_all, fields(kind = %K::KIND, user_id = context.user_id()))]
pub async fn list_versions<K: ArtifactKind>(
    context: &RequestContext,
    store: &ArtifactStore<K>,
) -> Result<Vec<VersionMetadata>, DomainError> {
    Ok(store.list_versions(context.user_id()).await?)
}

/// Repairs the caller's current pointer after an interrupted commit and
/// returns the version now current.
///
/// # Errors
///
/// Returns `DomainError::Storage` on I/O failure.
#[instrument(skip_all, fields(kind = %K::KIND, user_id = context.user_id()))]
pub async fn reconcile_current<K: ArtifactKind>(
    context: &RequestContext,
    store: &ArtifactStore<K>,
) -> Result<Option<String>, DomainError> {
    let current = store.reconcile_current(context.user_id()).await?;
    info!(
        correlation_id = context.correlation_id(),
        version_id = ?current,
        "current pointer reconciled"
    );
    Ok(current)
}
