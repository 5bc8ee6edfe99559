//! Required-field validation shared by commits and proposals.

use std::fmt;

use thiserror::Error;

use crate::artifact::{ArtifactKind, ArtifactKindId};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// JSON name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl FieldViolation {
    /// A violation for a required field that is blank or absent.
    #[must_use]
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            message: format!("{field} is required"),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// An artifact failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} failed validation: {}", kind.display_name(), join(violations))]
pub struct ValidationFailure {
    /// Kind of the rejected artifact.
    pub kind: ArtifactKindId,
    /// Every violated field, in declaration order.
    pub violations: Vec<FieldViolation>,
    /// Raw completion response the artifact was parsed from, if any.
    pub raw_response: Option<String>,
}

impl ValidationFailure {
    /// Names of every violated field.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }

    /// Attaches the raw completion response for debugging.
    #[must_use]
    pub fn with_raw_response(mut self, raw_response: impl Into<String>) -> Self {
        self.raw_response = Some(raw_response.into());
        self
    }
}

fn join(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates an artifact against its kind's required-field list.
///
/// # Errors
///
/// Returns a `ValidationFailure` naming every required field that is blank.
pub fn validate<K: ArtifactKind>(artifact: &K) -> Result<(), ValidationFailure> {
    let violations: Vec<FieldViolation> = artifact
        .fields()
        .into_iter()
        .filter(|f| f.required && f.value.trim().is_empty())
        .map(|f| FieldViolation::required(f.name))
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure {
            kind: K::KIND,
            violations,
            raw_response: None,
        })
    }
}
