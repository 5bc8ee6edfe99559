//! Predictable version ids.

use std::sync::atomic::{AtomicU64, Ordering};

use chronicle_core::ids::VersionIdGenerator;

/// Hands out `v1`, `v2`, `v3`, ... (or `<prefix>1`, ...) in order.
#[derive(Debug)]
pub struct SequenceVersionIds {
    prefix: String,
    next: AtomicU64,
}

impl SequenceVersionIds {
    /// Sequence using the `v` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix("v")
    }

    /// Sequence using a custom prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequenceVersionIds {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionIdGenerator for SequenceVersionIds {
    fn next_version_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}{n}", self.prefix)
    }
}
