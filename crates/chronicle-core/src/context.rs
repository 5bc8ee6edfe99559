//! Request-scoped caller context.

use crate::error::DomainError;

/// Who is asking, under which correlation token, in which environment.
///
/// Built once per request by the caller and passed explicitly into command
/// and query handlers; nothing in the domain reads identity or environment
/// from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    user_id: String,
    correlation_id: String,
    environment: Option<String>,
}

impl RequestContext {
    /// Creates a context for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the user id or correlation id
    /// is blank.
    pub fn new(
        user_id: impl Into<String>,
        correlation_id: impl Into<String>,
        environment: Option<String>,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.into();
        let correlation_id = correlation_id.into();
        if user_id.trim().is_empty() {
            return Err(DomainError::InvalidInput("user id must not be empty".into()));
        }
        if correlation_id.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "correlation id must not be empty".into(),
            ));
        }
        Ok(Self {
            user_id,
            correlation_id,
            environment: environment.filter(|e| !e.trim().is_empty()),
        })
    }

    /// The user whose chains are being read or written.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Correlation token; recorded as the source request id of new versions.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Deployment environment label, if configured.
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_blank_user_id() {
        let result = RequestContext::new("  ", "corr-1", None);

        match result.unwrap_err() {
            DomainError::InvalidInput(msg) => assert_eq!(msg, "user id must not be empty"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_blank_correlation_id() {
        let result = RequestContext::new("alice", "", None);

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_blank_environment_is_dropped() {
        let ctx = RequestContext::new("alice", "corr-1", Some(" ".to_owned())).unwrap();

        assert_eq!(ctx.environment(), None);
        assert_eq!(ctx.user_id(), "alice");
        assert_eq!(ctx.correlation_id(), "corr-1");
    }
}
