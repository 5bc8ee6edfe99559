//! Shared application state.

use std::sync::Arc;

use chronicle_artifacts::ArtifactStore;
use chronicle_blob_store::{FsBlobStore, InMemoryBlobStore};
use chronicle_completion::{OpenAiCompletionEngine, StaticCompletionEngine};
use chronicle_core::artifact::{ArtifactKind, StoryRoot, WorldState};
use chronicle_core::clock::{Clock, MonotonicClock, SystemClock};
use chronicle_core::completion::CompletionEngine;
use chronicle_core::ids::{RandomVersionIds, VersionIdGenerator};
use chronicle_core::storage::BlobStore;
use chronicle_proposals::{
    DirectoryTemplateProvider, EmbeddedTemplateProvider, PromptFactory, ProposalPipeline,
    TemplateProvider,
};
use tracing::info;

use crate::config::{AppConfig, CompletionConfig, StorageConfig};
use crate::error::AppError;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Story Root version chains.
    pub story_roots: ArtifactStore<StoryRoot>,
    /// Story Root merge proposals.
    pub story_root_proposals: ProposalPipeline<StoryRoot>,
    /// World State version chains.
    pub world_states: ArtifactStore<WorldState>,
    /// World State merge proposals.
    pub world_state_proposals: ProposalPipeline<WorldState>,
    /// Provenance label for every request context.
    pub environment: Option<String>,
}

impl AppState {
    /// Wires both artifact kinds over the same collaborators.
    #[must_use]
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn VersionIdGenerator>,
        templates: Arc<dyn TemplateProvider>,
        engine: Arc<dyn CompletionEngine>,
        environment: Option<String>,
    ) -> Self {
        let prompts = PromptFactory::new(templates);
        Self {
            story_roots: ArtifactStore::new(blobs.clone(), clock.clone(), ids.clone()),
            story_root_proposals: ProposalPipeline::new(prompts.clone(), engine.clone()),
            world_states: ArtifactStore::new(blobs, clock, ids),
            world_state_proposals: ProposalPipeline::new(prompts, engine),
            environment,
        }
    }

    /// Builds the production collaborators described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the completion engine rejects its
    /// settings.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let blobs: Arc<dyn BlobStore> = match &config.storage {
            StorageConfig::Memory => {
                info!("using in-memory blob storage");
                Arc::new(InMemoryBlobStore::new())
            }
            StorageConfig::Filesystem(root) => {
                info!(root = %root.display(), "using filesystem blob storage");
                Arc::new(FsBlobStore::new(root.clone()))
            }
        };

        let engine: Arc<dyn CompletionEngine> = match &config.completion {
            CompletionConfig::OpenAi(openai) => {
                info!(model = %openai.model, "using OpenAI completion engine");
                Arc::new(
                    OpenAiCompletionEngine::new(openai.clone())
                        .map_err(|e| AppError::Config(e.to_string()))?,
                )
            }
            CompletionConfig::Static(response) => {
                info!("using static completion engine");
                Arc::new(StaticCompletionEngine::new(response.clone()))
            }
        };

        let templates: Arc<dyn TemplateProvider> = match &config.template_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "loading prompt templates from directory");
                Arc::new(DirectoryTemplateProvider::with_fallback(
                    dir.clone(),
                    Arc::new(EmbeddedTemplateProvider),
                ))
            }
            None => Arc::new(EmbeddedTemplateProvider),
        };

        Ok(Self::new(
            blobs,
            Arc::new(MonotonicClock::new(SystemClock)),
            Arc::new(RandomVersionIds),
            templates,
            engine,
            Some(config.environment.clone()),
        ))
    }
}

/// Per-kind access to the state, so one set of handlers serves every
/// artifact kind.
pub trait KindServices: ArtifactKind {
    /// The version-chain store for this kind.
    fn store(state: &AppState) -> &ArtifactStore<Self>;

    /// The proposal pipeline for this kind.
    fn proposals(state: &AppState) -> &ProposalPipeline<Self>;
}

impl KindServices for StoryRoot {
    fn store(state: &AppState) -> &ArtifactStore<Self> {
        &state.story_roots
    }

    fn proposals(state: &AppState) -> &ProposalPipeline<Self> {
        &state.story_root_proposals
    }
}

impl KindServices for WorldState {
    fn store(state: &AppState) -> &ArtifactStore<Self> {
        &state.world_states
    }

    fn proposals(state: &AppState) -> &ProposalPipeline<Self> {
        &state.world_state_proposals
    }
}
