//! Blob store implementations for Chronicle.
//!
//! Both stores tag every blob with the SHA-256 of its content and honour
//! `Precondition::IfAbsent` / `Precondition::IfMatch`, which is what lets the
//! commit path guard the current-pointer write.

pub mod filesystem;
pub mod memory;

use chronicle_core::storage::{BlobError, ETag, Precondition};
use sha2::{Digest, Sha256};

pub use filesystem::FsBlobStore;
pub use memory::InMemoryBlobStore;

/// Computes the entity tag for `bytes`.
#[must_use]
pub fn content_etag(bytes: &[u8]) -> ETag {
    ETag(format!("{:x}", Sha256::digest(bytes)))
}

/// Checks `precondition` against the content currently stored at `path`.
pub(crate) fn check_precondition(
    path: &str,
    existing: Option<&[u8]>,
    precondition: &Precondition,
) -> Result<(), BlobError> {
    let holds = match (precondition, existing) {
        (Precondition::None, _) => true,
        (Precondition::IfAbsent, existing) => existing.is_none(),
        (Precondition::IfMatch(_), None) => false,
        (Precondition::IfMatch(expected), Some(bytes)) => content_etag(bytes) == *expected,
    };
    if holds {
        Ok(())
    } else {
        Err(BlobError::PreconditionFailed {
            path: path.to_owned(),
        })
    }
}
