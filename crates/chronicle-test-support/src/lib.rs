//! Shared test doubles and fixtures for the Chronicle crates.

mod blob_store;
mod clock;
mod completion;
mod fixtures;
mod ids;

pub use blob_store::{FailingBlobStore, FlakyBlobStore, RecordingBlobStore};
pub use clock::SteppingClock;
pub use completion::{FailingCompletionEngine, ScriptedCompletionEngine};
pub use fixtures::{fixed_time, request_context, sample_story_root, sample_world_state};
pub use ids::SequenceVersionIds;
