//! Chronicle API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chronicle_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// Tracing or trace export could not be set up.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// JSON body returned for error responses.
///
/// The correlation id is filled in by the correlation middleware, which
/// finds a copy of this body in the response extensions.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Correlation id of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// On conflicts, the version the caller expected to be current.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version_id: Option<String>,
    /// On conflicts, the version that actually is current.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version_id: Option<String>,
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        let status = status_for(self.error);
        let mut response = (status, Json(self.clone())).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// HTTP-layer error: a `DomainError` or a missing resource.
#[derive(Debug)]
pub enum ApiError {
    /// A failure raised by one of the bounded contexts.
    Domain(DomainError),
    /// The requested artifact or version does not exist.
    NotFound(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

fn code_for(err: &DomainError) -> &'static str {
    match err {
        DomainError::InvalidInput(_) => "invalid_input",
        DomainError::Validation(_) => "validation_error",
        DomainError::Conflict { .. } => "version_conflict",
        DomainError::Storage(_) => "storage_error",
        DomainError::Completion(_) => "completion_error",
        DomainError::Parse { .. } => "parse_error",
        DomainError::Substitution { .. } => "substitution_error",
        DomainError::TemplateNotFound(_) => "template_not_found",
    }
}

fn status_for(code: &str) -> StatusCode {
    match code {
        "invalid_input" => StatusCode::BAD_REQUEST,
        "validation_error" => StatusCode::UNPROCESSABLE_ENTITY,
        "version_conflict" => StatusCode::CONFLICT,
        "not_found" => StatusCode::NOT_FOUND,
        "completion_error" | "parse_error" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApiError> for ErrorBody {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(message) => Self {
                error: "not_found",
                message,
                correlation_id: None,
                expected_version_id: None,
                current_version_id: None,
            },
            ApiError::Domain(err) => {
                let (expected_version_id, current_version_id) = match &err {
                    DomainError::Conflict { expected, actual } => {
                        (Some(expected.clone()), actual.clone())
                    }
                    _ => (None, None),
                };
                Self {
                    error: code_for(&err),
                    message: err.to_string(),
                    correlation_id: None,
                    expected_version_id,
                    current_version_id,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ErrorBody::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use chronicle_core::artifact::ArtifactKindId;
    use chronicle_core::completion::CompletionError;
    use chronicle_core::storage::{BlobError, StorageError};
    use chronicle_core::validation::{FieldViolation, ValidationFailure};

    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::Domain(err).into_response().status()
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        assert_eq!(
            status_of(DomainError::InvalidInput("blank".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_validation_maps_to_422() {
        let failure = ValidationFailure {
            kind: ArtifactKindId::StoryRoot,
            violations: vec![FieldViolation::required("genre")],
            raw_response: None,
        };

        assert_eq!(
            status_of(DomainError::Validation(failure)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_conflict_maps_to_409_with_both_versions() {
        // Arrange
        let err = ApiError::Domain(DomainError::Conflict {
            expected: "v1".into(),
            actual: Some("v2".into()),
        });

        // Act
        let body = ErrorBody::from(err);

        // Assert
        assert_eq!(status_for(body.error), StatusCode::CONFLICT);
        assert_eq!(body.error, "version_conflict");
        assert_eq!(body.expected_version_id.as_deref(), Some("v1"));
        assert_eq!(body.current_version_id.as_deref(), Some("v2"));
    }

    #[test]
    fn test_storage_maps_to_500() {
        let err = StorageError::Blob(BlobError::Io {
            path: "x".into(),
            message: "disk full".into(),
        });

        assert_eq!(
            status_of(DomainError::Storage(err)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_completion_and_parse_map_to_502() {
        assert_eq!(
            status_of(DomainError::Completion(CompletionError::Network(
                "refused".into()
            ))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(DomainError::Parse {
                reason: "expected value".into(),
                raw_response: "nope".into(),
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_template_failures_map_to_500() {
        assert_eq!(
            status_of(DomainError::TemplateNotFound("story-root-merge".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DomainError::Substitution {
                template_id: "t".into(),
                missing: vec!["user_input".into()],
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_maps_to_404_and_keeps_body_in_extensions() {
        let response = ApiError::NotFound("no story root".into()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.extensions().get::<ErrorBody>().unwrap();
        assert_eq!(body.error, "not_found");
        assert_eq!(body.message, "no story root");
    }
}
