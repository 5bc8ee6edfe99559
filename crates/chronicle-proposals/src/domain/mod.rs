//! Proposal domain types.

pub mod commands;
pub mod proposal;
