//! Chronicle: merge proposals.
//!
//! Turns a current artifact plus free-form author input into a validated
//! candidate artifact by way of a prompt template and a completion engine.
//! Nothing here persists; committing a proposal is the artifacts context's
//! job.

pub mod application;
pub mod domain;
pub mod prompt;
pub mod templates;

pub use application::pipeline::ProposalPipeline;
pub use domain::proposal::{Operation, PromptInput, Proposal};
pub use prompt::PromptFactory;
pub use templates::{DirectoryTemplateProvider, EmbeddedTemplateProvider, TemplateProvider};
