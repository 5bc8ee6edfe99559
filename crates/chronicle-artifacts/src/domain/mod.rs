//! Commands accepted by the artifacts context.

pub mod commands;
