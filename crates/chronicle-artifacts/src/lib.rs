//! Chronicle: versioned artifact chains.
//!
//! Responsible for storing Story Root and World State documents as
//! append-only version chains with a movable current pointer, and for the
//! optimistic-concurrency commit protocol that advances that pointer.

pub mod application;
pub mod domain;
pub mod store;

pub use store::{ArtifactStore, NewVersion};
