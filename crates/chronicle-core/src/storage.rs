//! Blob storage abstraction.
//!
//! The artifact store is the sole owner of the path scheme; the blob store
//! only moves bytes. Implementations must tolerate independent concurrent
//! callers.

use async_trait::async_trait;
use thiserror::Error;

/// Opaque entity tag identifying one revision of a blob's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag(pub String);

impl ETag {
    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A blob read from storage together with its entity tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Raw content.
    pub bytes: Vec<u8>,
    /// Tag of this revision.
    pub etag: ETag,
}

/// Condition that must hold for a write to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Write unconditionally, creating or replacing.
    None,
    /// Write only if nothing exists at the path.
    IfAbsent,
    /// Write only if the existing blob carries this tag.
    IfMatch(ETag),
}

/// Failures reported by a blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The underlying store could not complete the operation.
    #[error("blob I/O failed at {path}: {message}")]
    Io {
        /// The path being accessed.
        path: String,
        /// Backend-specific detail.
        message: String,
    },

    /// A conditional write was rejected.
    #[error("precondition failed for {path}")]
    PreconditionFailed {
        /// The path being written.
        path: String,
    },

    /// The path cannot be represented by this store.
    #[error("invalid blob path {path}: {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Storage failures surfaced by the artifact store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The blob store failed.
    #[error("storage error: {0}")]
    Blob(#[from] BlobError),

    /// A stored document could not be decoded or encoded.
    #[error("storage error: corrupt document at {path}: {reason}")]
    Corrupt {
        /// The offending path.
        path: String,
        /// Decoder detail.
        reason: String,
    },

    /// The current pointer references a version that does not exist.
    #[error("storage error: current pointer at {path} references missing version {version_id}")]
    DanglingPointer {
        /// The pointer's path.
        path: String,
        /// The version it references.
        version_id: String,
    },
}

/// Generic blob read/write/list collaborator.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Reads a blob, returning `None` if nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError>;

    /// Writes `bytes` at `path` if `precondition` holds and returns the new tag.
    async fn put_if(
        &self,
        path: &str,
        bytes: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, BlobError>;

    /// Returns true if a blob exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, BlobError>;

    /// Lists every blob path that starts with `prefix`, in ascending order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError>;

    /// Deletes the blob at `path`. Deleting a missing blob is not an error.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;

    /// Writes `bytes` at `path` unconditionally.
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<ETag, BlobError> {
        self.put_if(path, bytes, Precondition::None).await
    }
}
