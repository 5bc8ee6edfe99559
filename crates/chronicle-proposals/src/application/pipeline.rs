//! The four-phase proposal pipeline: prepare, assemble, invoke,
//! parse-and-validate.
//!
//! Each phase is a separate method so it can be exercised on its own;
//! [`ProposalPipeline::propose`] runs them in order. The completion engine
//! is called exactly once per proposal and never retried.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use chronicle_core::artifact::ArtifactKind;
use chronicle_core::completion::CompletionEngine;
use chronicle_core::error::DomainError;
use chronicle_core::validation::validate;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::domain::proposal::{
    Operation, PromptInput, Proposal, USER_INPUT_VARIABLE, current_variable, template_id,
};
use crate::prompt::PromptFactory;

/// Rejects blank author input.
pub(crate) fn require_input(raw_input: &str) -> Result<(), DomainError> {
    if raw_input.trim().is_empty() {
        Err(DomainError::InvalidInput(
            "raw input must not be empty".into(),
        ))
    } else {
        Ok(())
    }
}

/// Produces validated candidate artifacts of kind `K`.
pub struct ProposalPipeline<K> {
    prompts: PromptFactory,
    engine: Arc<dyn CompletionEngine>,
    kind: PhantomData<fn() -> K>,
}

impl<K> Clone for ProposalPipeline<K> {
    fn clone(&self) -> Self {
        Self {
            prompts: self.prompts.clone(),
            engine: Arc::clone(&self.engine),
            kind: PhantomData,
        }
    }
}

impl<K: ArtifactKind> std::fmt::Debug for ProposalPipeline<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProposalPipeline")
            .field("kind", &K::KIND)
            .finish_non_exhaustive()
    }
}

impl<K: ArtifactKind> ProposalPipeline<K> {
    /// Creates a pipeline assembling prompts with `prompts` and sending them
    /// to `engine`.
    #[must_use]
    pub fn new(prompts: PromptFactory, engine: Arc<dyn CompletionEngine>) -> Self {
        Self {
            prompts,
            engine,
            kind: PhantomData,
        }
    }

    /// Phase 1: chooses `Create` or `Merge` and builds the template
    /// variables. Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` for blank `raw_input`.
    pub fn prepare(current: Option<&K>, raw_input: &str) -> Result<PromptInput, DomainError> {
        require_input(raw_input)?;

        let operation = Operation::for_current(current.is_some());
        let mut variables = HashMap::from([(USER_INPUT_VARIABLE.to_owned(), raw_input.to_owned())]);
        if let Some(current) = current {
            let json = serde_json::to_string(current).map_err(|e| {
                DomainError::InvalidInput(format!("current artifact cannot be encoded: {e}"))
            })?;
            variables.insert(current_variable(K::KIND), json);
        }

        Ok(PromptInput {
            operation,
            template_id: template_id(K::KIND, operation),
            variables,
        })
    }

    /// Phase 2: loads the template and substitutes the variables.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TemplateNotFound` or
    /// `DomainError::Substitution`.
    pub async fn assemble(&self, input: &PromptInput) -> Result<String, DomainError> {
        self.prompts.assemble(input).await
    }

    /// Phase 3: sends the prompt to the completion engine, once.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Completion` with the engine's failure unchanged.
    #[instrument(skip_all, fields(kind = %K::KIND, prompt_len = prompt.len()))]
    pub async fn invoke(&self, prompt: &str) -> Result<String, DomainError> {
        match self.engine.invoke(prompt).await {
            Ok(response) => {
                debug!(response_len = response.len(), "completion received");
                Ok(response)
            }
            Err(e) => {
                error!(error = %e, "completion engine call failed");
                Err(e.into())
            }
        }
    }

    /// Phase 4: reads the raw response as a `K` and validates it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Parse` if the response is blank, not JSON of the
    /// right shape, `null`, or an artifact with every field blank; and
    /// `DomainError::Validation` (carrying the raw response) if a required
    /// field is blank.
    pub fn parse_and_validate(raw_response: &str) -> Result<K, DomainError> {
        let parse_error = |reason: String| DomainError::Parse {
            reason,
            raw_response: raw_response.to_owned(),
        };

        if raw_response.trim().is_empty() {
            return Err(parse_error("completion engine returned an empty response".into()));
        }

        let value: Value = serde_json::from_str(raw_response)
            .map_err(|e| parse_error(format!("response is not valid JSON: {e}")))?;
        if value.is_null() {
            return Err(parse_error("response deserialized to null".into()));
        }
        let artifact: K = serde_json::from_value(value).map_err(|e| {
            parse_error(format!(
                "response is not a {} object: {e}",
                K::KIND.display_name()
            ))
        })?;
        if artifact.is_blank() {
            return Err(parse_error(format!(
                "response deserialized to an empty {}",
                K::KIND.display_name()
            )));
        }

        validate(&artifact).map_err(|failure| failure.with_raw_response(raw_response))?;
        Ok(artifact)
    }

    /// Runs all four phases for `current` and `raw_input`.
    ///
    /// # Errors
    ///
    /// Returns the first phase's error.
    #[instrument(skip_all, fields(kind = %K::KIND, has_current = current.is_some()))]
    pub async fn propose(
        &self,
        current: Option<K>,
        raw_input: &str,
    ) -> Result<Proposal<K>, DomainError> {
        let input = Self::prepare(current.as_ref(), raw_input)?;
        let prompt = self.assemble(&input).await?;
        let response = self.invoke(&prompt).await?;
        let proposal = Self::parse_and_validate(&response)?;

        info!(
            template_id = %input.template_id,
            operation = ?input.operation,
            "proposal produced"
        );
        Ok(Proposal { proposal, current })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chronicle_core::artifact::{StoryRoot, WorldState};
    use chronicle_core::completion::CompletionError;
    use chronicle_core::error::DomainError;
    use chronicle_test_support::{
        FailingCompletionEngine, ScriptedCompletionEngine, sample_story_root, sample_world_state,
    };

    use super::ProposalPipeline;
    use crate::domain::proposal::Operation;
    use crate::prompt::PromptFactory;
    use crate::templates::EmbeddedTemplateProvider;

    const STORY_JSON: &str = r#"{"story_root_id":"s-1","genre":"Science Fiction","tone":"Dark","thematic_pillars":"AI consciousness","notes":""}"#;

    fn pipeline<K: chronicle_core::artifact::ArtifactKind>(
        engine: Arc<dyn chronicle_core::completion::CompletionEngine>,
    ) -> ProposalPipeline<K> {
        ProposalPipeline::new(PromptFactory::new(Arc::new(EmbeddedTemplateProvider)), engine)
    }

    #[test]
    fn test_prepare_without_current_selects_create() {
        let input = ProposalPipeline::<StoryRoot>::prepare(None, "a dark sci-fi story").unwrap();

        assert_eq!(input.operation, Operation::Create);
        assert_eq!(input.template_id, "story-root-create");
        assert_eq!(input.variables["user_input"], "a dark sci-fi story");
        assert!(!input.variables.contains_key("current_story_root"));
    }

    #[test]
    fn test_prepare_with_current_selects_merge_and_embeds_json() {
        // Arrange
        let current = sample_world_state();

        // Act
        let input = ProposalPipeline::<WorldState>::prepare(Some(&current), "add dragons").unwrap();

        // Assert
        assert_eq!(input.operation, Operation::Merge);
        assert_eq!(input.template_id, "world-state-merge");
        let embedded: WorldState =
            serde_json::from_str(&input.variables["current_world_state"]).unwrap();
        assert_eq!(embedded, current);
    }

    #[test]
    fn test_prepare_rejects_blank_input() {
        let result = ProposalPipeline::<StoryRoot>::prepare(None, " \n\t ");

        match result.unwrap_err() {
            DomainError::InvalidInput(msg) => assert_eq!(msg, "raw input must not be empty"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_accepts_complete_artifact() {
        let parsed = ProposalPipeline::<StoryRoot>::parse_and_validate(STORY_JSON).unwrap();

        assert_eq!(parsed.genre, "Science Fiction");
    }

    #[test]
    fn test_parse_rejects_blank_response() {
        let result = ProposalPipeline::<StoryRoot>::parse_and_validate("   ");

        assert!(matches!(result, Err(DomainError::Parse { .. })));
    }

    #[test]
    fn test_parse_rejects_non_json_and_keeps_raw_response() {
        let result = ProposalPipeline::<StoryRoot>::parse_and_validate("Sure! Here is your story.");

        match result.unwrap_err() {
            DomainError::Parse { raw_response, .. } => {
                assert_eq!(raw_response, "Sure! Here is your story.");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_null_and_empty_objects() {
        for raw in ["null", "{}", r#"{"genre":"  "}"#] {
            let result = ProposalPipeline::<StoryRoot>::parse_and_validate(raw);
            assert!(
                matches!(result, Err(DomainError::Parse { .. })),
                "{raw} should be a parse error"
            );
        }
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        for raw in ["42", r#""a story""#, "true"] {
            let result = ProposalPipeline::<StoryRoot>::parse_and_validate(raw);
            assert!(matches!(result, Err(DomainError::Parse { .. })), "{raw}");
        }
    }

    #[test]
    fn test_validation_failure_carries_raw_response() {
        // Arrange
        let raw = r#"{"story_root_id":"s-1","genre":"Noir","tone":"","thematic_pillars":"Loss"}"#;

        // Act
        let result = ProposalPipeline::<StoryRoot>::parse_and_validate(raw);

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(failure) => {
                assert_eq!(failure.fields(), vec!["tone"]);
                assert_eq!(failure.raw_response.as_deref(), Some(raw));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_propose_without_current_returns_proposal_and_no_current() {
        // Arrange
        let engine = Arc::new(ScriptedCompletionEngine::new([STORY_JSON]));
        let pipeline = pipeline::<StoryRoot>(engine.clone());

        // Act
        let result = pipeline
            .propose(None, "create a dark sci-fi story")
            .await
            .unwrap();

        // Assert
        assert_eq!(result.proposal.story_root_id, "s-1");
        assert!(result.current.is_none());
        let prompts = engine.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("create a dark sci-fi story"));
    }

    #[tokio::test]
    async fn test_propose_with_current_sends_current_json() {
        // Arrange
        let engine = Arc::new(ScriptedCompletionEngine::new([STORY_JSON]));
        let pipeline = pipeline::<StoryRoot>(engine.clone());
        let current = sample_story_root();

        // Act
        let result = pipeline
            .propose(Some(current.clone()), "make it darker")
            .await
            .unwrap();

        // Assert
        assert_eq!(result.current, Some(current.clone()));
        assert!(engine.prompts()[0].contains(&serde_json::to_string(&current).unwrap()));
    }

    #[tokio::test]
    async fn test_blank_input_never_reaches_engine() {
        let engine = Arc::new(ScriptedCompletionEngine::new([STORY_JSON]));
        let pipeline = pipeline::<StoryRoot>(engine.clone());

        let result = pipeline.propose(None, "").await;

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_completion_failure_is_surfaced_unchanged() {
        let pipeline = pipeline::<WorldState>(Arc::new(FailingCompletionEngine::rate_limited()));

        let result = pipeline.propose(None, "a desert world").await;

        match result.unwrap_err() {
            DomainError::Completion(CompletionError::RateLimited { retry_after_secs }) => {
                assert_eq!(retry_after_secs, Some(30));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_failure_is_surfaced_unchanged() {
        let pipeline = pipeline::<StoryRoot>(Arc::new(FailingCompletionEngine::network()));

        let result = pipeline.propose(None, "a haunted lighthouse").await;

        match result.unwrap_err() {
            DomainError::Completion(CompletionError::Network(message)) => {
                assert_eq!(message, "connection reset");
            }
            other => panic!("expected Network, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_failure_is_not_retried() {
        // Arrange
        let engine = Arc::new(ScriptedCompletionEngine::with_results([
            Err(CompletionError::Network("connection refused".into())),
            Ok(STORY_JSON.to_owned()),
        ]));
        let pipeline = pipeline::<StoryRoot>(engine.clone());

        // Act
        let result = pipeline.propose(None, "a story").await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::Completion(CompletionError::Network(_)))
        ));
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_engine_is_called_once_even_when_response_is_unusable() {
        let engine = Arc::new(ScriptedCompletionEngine::new(["not json", STORY_JSON]));
        let pipeline = pipeline::<StoryRoot>(engine.clone());

        let result = pipeline.propose(None, "a story").await;

        assert!(matches!(result, Err(DomainError::Parse { .. })));
        assert_eq!(engine.calls(), 1);
    }
}
