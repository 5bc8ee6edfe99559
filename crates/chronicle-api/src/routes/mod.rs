//! Route modules: health plus one generic router per artifact kind.

pub mod artifacts;
pub mod health;
