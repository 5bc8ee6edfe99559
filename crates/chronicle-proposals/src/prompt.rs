//! Prompt assembly: strict `{name}` placeholder substitution.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use chronicle_core::error::DomainError;
use regex::{Captures, Regex};

use crate::domain::proposal::PromptInput;
use crate::templates::TemplateProvider;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid"));

/// Replaces every `{name}` in `template` with `variables[name]`.
///
/// Substitution is a single pass over the template, so placeholder syntax
/// inside substituted values is left alone. Unused variables are ignored.
///
/// # Errors
///
/// Returns `DomainError::Substitution` naming every placeholder without a
/// value, each once, in order of first appearance.
pub fn substitute(
    template_id: &str,
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, DomainError> {
    let mut missing: Vec<String> = Vec::new();
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        if let Some(value) = variables.get(name) {
            value.clone()
        } else {
            if !missing.iter().any(|m| m == name) {
                missing.push(name.to_owned());
            }
            caps[0].to_owned()
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(DomainError::Substitution {
            template_id: template_id.to_owned(),
            missing,
        })
    }
}

/// Loads a template and fills it in.
#[derive(Clone)]
pub struct PromptFactory {
    templates: Arc<dyn TemplateProvider>,
}

impl std::fmt::Debug for PromptFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptFactory").finish_non_exhaustive()
    }
}

impl PromptFactory {
    /// Creates a factory over `templates`.
    #[must_use]
    pub fn new(templates: Arc<dyn TemplateProvider>) -> Self {
        Self { templates }
    }

    /// Assembles the prompt described by `input`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` for a blank template id,
    /// `DomainError::TemplateNotFound` if the provider has no such template,
    /// and `DomainError::Substitution` for unresolved placeholders.
    pub async fn assemble(&self, input: &PromptInput) -> Result<String, DomainError> {
        if input.template_id.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "template id must not be empty".into(),
            ));
        }
        let template = self.templates.load(&input.template_id).await?;
        substitute(&input.template_id, &template, &input.variables)
    }
}
