//! Version id generation.
//!
//! In production, ids are random UUIDs. In tests, a sequence
//! implementation is injected so version ids are predictable.

use uuid::Uuid;

/// Abstraction over fresh version id generation.
pub trait VersionIdGenerator: Send + Sync {
    /// Returns an id that has never been returned before.
    fn next_version_id(&self) -> String;
}

/// Production generator: 32 lowercase hex characters from a UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomVersionIds;

impl VersionIdGenerator for RandomVersionIds {
    fn next_version_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
