//! Per-kind access to version chains.
//!
//! An [`ArtifactStore`] owns the path scheme for one artifact kind and is the
//! only code that reads or writes version objects and current pointers.
//! Version objects are written once with [`Precondition::IfAbsent`] and never
//! touched again; the current pointer is the only blob that is overwritten.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chronicle_core::artifact::ArtifactKind;
use chronicle_core::clock::Clock;
use chronicle_core::ids::VersionIdGenerator;
use chronicle_core::paths;
use chronicle_core::storage::{BlobStore, ETag, Precondition, StorageError};
use chronicle_core::version::{CurrentPointer, VersionMetadata, VersionedArtifact};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Everything needed to append one version to a chain.
#[derive(Debug, Clone)]
pub struct NewVersion<'a, K> {
    /// Owner of the chain.
    pub user_id: &'a str,
    /// Content of the new version.
    pub artifact: &'a K,
    /// Version that was current when the commit started.
    pub prior_version_id: Option<String>,
    /// Correlation token of the originating request.
    pub source_request_id: Option<String>,
    /// Deployment environment label.
    pub environment: Option<String>,
    /// Whether the content came through the completion engine.
    pub llm_assisted: bool,
    /// Condition the pointer write must satisfy.
    pub pointer_precondition: Precondition,
}

/// CRUD over the version chains of artifact kind `K`.
pub struct ArtifactStore<K> {
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn VersionIdGenerator>,
    kind: PhantomData<fn() -> K>,
}

impl<K> Clone for ArtifactStore<K> {
    fn clone(&self) -> Self {
        Self {
            blobs: Arc::clone(&self.blobs),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
            kind: PhantomData,
        }
    }
}

impl<K: ArtifactKind> fmt::Debug for ArtifactStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("kind", &K::KIND)
            .finish_non_exhaustive()
    }
}

impl<K: ArtifactKind> ArtifactStore<K> {
    /// Creates a store over `blobs`, stamping versions with `clock` and
    /// naming them with `ids`.
    #[must_use]
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn VersionIdGenerator>,
    ) -> Self {
        Self {
            blobs,
            clock,
            ids,
            kind: PhantomData,
        }
    }

    /// Returns the artifact the current pointer references, or `None` if
    /// the chain has no pointer yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DanglingPointer` if the pointer references a
    /// version that does not exist, `StorageError::Corrupt` if it names no
    /// version at all, and `StorageError` on any I/O or decode failure.
    #[instrument(skip(self), fields(kind = %K::KIND))]
    pub async fn get_current(&self, user_id: &str) -> Result<Option<K>, StorageError> {
        let Some((pointer, _)) = self.read_pointer(user_id).await? else {
            return Ok(None);
        };
        if pointer.version_id.trim().is_empty() {
            let path = paths::current_path(user_id, K::KIND);
            warn!(%path, "current pointer names no version");
            return Err(StorageError::Corrupt {
                path,
                reason: "current pointer names no version".into(),
            });
        }

        match self.read_version(user_id, &pointer.version_id).await? {
            Some(versioned) => Ok(Some(versioned.artifact)),
            None => {
                let path = paths::current_path(user_id, K::KIND);
                warn!(%path, version_id = %pointer.version_id, "current pointer is dangling");
                Err(StorageError::DanglingPointer {
                    path,
                    version_id: pointer.version_id,
                })
            }
        }
    }

    /// Returns one version's artifact, or `None` for an unknown id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on any I/O or decode failure.
    #[instrument(skip(self), fields(kind = %K::KIND))]
    pub async fn get_version(
        &self,
        user_id: &str,
        version_id: &str,
    ) -> Result<Option<K>, StorageError> {
        Ok(self
            .read_version(user_id, version_id)
            .await?
            .map(|versioned| versioned.artifact))
    }

    /// Returns the metadata of every version in the chain, newest first.
    ///
    /// Reads each version object once; cost is linear in chain length.
    /// Versions with equal timestamps are ordered by descending version id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on any I/O or decode failure.
    #[instrument(skip(self), fields(kind = %K::KIND))]
    pub async fn list_versions(&self, user_id: &str) -> Result<Vec<VersionMetadata>, StorageError> {
        let prefix = paths::versions_prefix(user_id, K::KIND);
        let listed = self.blobs.list(&prefix).await?;

        let mut versions = Vec::with_capacity(listed.len());
        for path in listed
            .iter()
            .filter(|path| paths::is_version_object(&prefix, path))
        {
            // A blob listed but gone by the time it is read is skipped.
            if let Some(versioned) = self.decode_version_at(path).await? {
                versions.push(versioned.metadata);
            }
        }

        versions.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.version_id.cmp(&a.version_id))
        });
        debug!(count = versions.len(), "listed versions");
        Ok(versions)
    }

    /// Reads the current pointer together with its entity tag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on any I/O or decode failure.
    pub async fn read_pointer(
        &self,
        user_id: &str,
    ) -> Result<Option<(CurrentPointer, ETag)>, StorageError> {
        let path = paths::current_path(user_id, K::KIND);
        let Some(blob) = self.blobs.get(&path).await? else {
            return Ok(None);
        };
        let pointer: CurrentPointer =
            serde_json::from_slice(&blob.bytes).map_err(|e| StorageError::Corrupt {
                path,
                reason: e.to_string(),
            })?;
        Ok(Some((pointer, blob.etag)))
    }

    /// Appends a version and advances the current pointer to it.
    ///
    /// Two sequential writes: the version object (which must not already
    /// exist), then the pointer (subject to `pointer_precondition`). If the
    /// second write fails the version remains durable but unreferenced
    /// until the next commit or [`ArtifactStore::reconcile_current`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either write fails, including
    /// `BlobError::PreconditionFailed` when the pointer changed underneath.
    #[instrument(
        skip(self, new_version),
        fields(kind = %K::KIND, user_id = %new_version.user_id)
    )]
    pub async fn save_new_version(
        &self,
        new_version: NewVersion<'_, K>,
    ) -> Result<VersionMetadata, StorageError> {
        let metadata = VersionMetadata {
            version_id: self.ids.next_version_id(),
            user_id: new_version.user_id.to_owned(),
            timestamp: self.clock.now(),
            source_request_id: new_version.source_request_id,
            prior_version_id: new_version.prior_version_id,
            environment: new_version.environment,
            llm_assisted: new_version.llm_assisted,
        };
        let document = VersionedArtifact {
            metadata,
            artifact: new_version.artifact.clone(),
        };

        let version_path =
            paths::version_path(new_version.user_id, K::KIND, &document.metadata.version_id);
        let bytes = encode(&version_path, &document)?;
        self.blobs
            .put_if(&version_path, bytes, Precondition::IfAbsent)
            .await?;
        debug!(path = %version_path, "version object written");

        self.write_pointer(
            new_version.user_id,
            &document.metadata.version_id,
            new_version.pointer_precondition,
        )
        .await?;

        Ok(document.metadata)
    }

    /// Points `current.json` at the newest listed version if it is missing
    /// or names something else. Returns the version now current, or `None`
    /// for an empty chain.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on I/O failure, or with
    /// `BlobError::PreconditionFailed` if a commit moved the pointer while
    /// reconciling.
    #[instrument(skip(self), fields(kind = %K::KIND))]
    pub async fn reconcile_current(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let versions = self.list_versions(user_id).await?;
        let Some(newest) = versions.into_iter().next() else {
            return Ok(None);
        };

        let precondition = match self.read_pointer(user_id).await? {
            Some((pointer, _)) if pointer.version_id == newest.version_id => {
                return Ok(Some(newest.version_id));
            }
            Some((_, etag)) => Precondition::IfMatch(etag),
            None => Precondition::IfAbsent,
        };

        warn!(version_id = %newest.version_id, "repairing current pointer");
        self.write_pointer(user_id, &newest.version_id, precondition)
            .await?;
        Ok(Some(newest.version_id))
    }

    async fn write_pointer(
        &self,
        user_id: &str,
        version_id: &str,
        precondition: Precondition,
    ) -> Result<ETag, StorageError> {
        let path = paths::current_path(user_id, K::KIND);
        let pointer = CurrentPointer {
            version_id: version_id.to_owned(),
        };
        let bytes = encode(&path, &pointer)?;
        Ok(self.blobs.put_if(&path, bytes, precondition).await?)
    }

    async fn read_version(
        &self,
        user_id: &str,
        version_id: &str,
    ) -> Result<Option<VersionedArtifact<K>>, StorageError> {
        let path = paths::version_path(user_id, K::KIND, version_id);
        self.decode_version_at(&path).await
    }

    async fn decode_version_at(
        &self,
        path: &str,
    ) -> Result<Option<VersionedArtifact<K>>, StorageError> {
        let Some(blob) = self.blobs.get(path).await? else {
            return Ok(None);
        };
        VersionedArtifact::from_slice(&blob.bytes)
            .map(Some)
            .map_err(|reason| StorageError::Corrupt {
                path: path.to_owned(),
                reason,
            })
    }
}

fn encode<T: Serialize>(path: &str, value: &T) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(value).map_err(|e| StorageError::Corrupt {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}
