//! Request-scoped caller identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chronicle_core::context::RequestContext;
use chronicle_core::error::DomainError;

use crate::error::ApiError;
use crate::middleware::CorrelationId;
use crate::state::AppState;

/// Header naming the calling user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// User assumed when no `X-User-Id` header is sent.
pub const DEFAULT_USER_ID: &str = "default-user";

/// The request context for the current caller: user from `X-User-Id`,
/// correlation id from the correlation middleware, environment from the
/// server configuration.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<CorrelationId>()
            .cloned()
            .unwrap_or_else(CorrelationId::generate);

        let user_id = match parts.headers.get(USER_ID_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| {
                    DomainError::InvalidInput("X-User-Id header must be visible ASCII".into())
                })?
                .trim(),
            None => "",
        };
        let user_id = if user_id.is_empty() { DEFAULT_USER_ID } else { user_id };

        let context = RequestContext::new(user_id, correlation_id.0, state.environment.clone())?;
        Ok(Self(context))
    }
}
