//! Correlation id propagation.

use axum::Json;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::error::ErrorBody;

/// Header carrying the correlation id in both directions.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// The correlation id of the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// A fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Adopts the caller's `X-Correlation-ID` (or generates one), makes it
/// available to handlers, stamps it into error bodies and echoes it on the
/// response.
pub async fn correlation_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(CorrelationId::generate, |v| CorrelationId(v.to_owned()));
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).await;

    if let Some(mut body) = response.extensions_mut().remove::<ErrorBody>() {
        body.correlation_id = Some(id.0.clone());
        let (parts, _) = response.into_parts();
        response = (parts, Json(body)).into_response();
    }
    if let Ok(value) = HeaderValue::from_str(&id.0) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}
