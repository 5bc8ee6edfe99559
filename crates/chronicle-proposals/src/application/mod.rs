//! Application layer: the proposal pipeline and its command handler.

pub mod command_handlers;
pub mod pipeline;
