//! Chronicle Core: shared domain abstractions.
//!
//! This crate defines the artifact kinds, version metadata, storage layout,
//! validation rules, error taxonomy and collaborator traits that the other
//! Chronicle crates build on. It contains no infrastructure code.

pub mod artifact;
pub mod clock;
pub mod command;
pub mod completion;
pub mod context;
pub mod error;
pub mod ids;
pub mod paths;
pub mod storage;
pub mod validation;
pub mod version;
