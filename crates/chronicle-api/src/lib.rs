//! Chronicle: HTTP API.
//!
//! Exposes both artifact kinds over axum: read the current artifact and its
//! history, propose a merge, commit a reviewed proposal, and repair a
//! pointer left behind by an interrupted commit.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use chronicle_core::artifact::{StoryRoot, WorldState};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::artifacts;
use crate::state::AppState;

/// Builds the full application router over `state`.
pub fn app(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with configured origins before exposing publicly.
    Router::new()
        .merge(routes::health::router())
        .nest(
            &artifacts::base_path::<StoryRoot>(),
            artifacts::router::<StoryRoot>(),
        )
        .nest(
            &artifacts::base_path::<WorldState>(),
            artifacts::router::<WorldState>(),
        )
        .layer(axum::middleware::from_fn(middleware::correlation_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
