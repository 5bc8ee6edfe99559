//! Routes shared by every artifact kind: current, history, propose, commit.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use chronicle_artifacts::application::{command_handlers, query_handlers};
use chronicle_artifacts::domain::commands::CommitArtifact;
use chronicle_core::error::DomainError;
use chronicle_core::version::VersionMetadata;
use chronicle_proposals::Proposal;
use chronicle_proposals::application::command_handlers::handle_propose_merge;
use chronicle_proposals::domain::commands::ProposeMerge;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::{AppState, KindServices};

/// Request body for POST /propose-merge.
#[derive(Debug, Deserialize)]
pub struct ProposeMergeRequest {
    /// Free-form author input.
    pub raw_input: String,
}

/// Request body for POST /commit. The artifact sits under its kind's
/// document key (`story_root` or `world_state`).
#[derive(Debug, Deserialize)]
pub struct CommitRequest {
    /// Version the caller believes is current.
    #[serde(default)]
    pub expected_version_id: Option<String>,
    /// Remaining members, including the artifact itself.
    #[serde(flatten)]
    pub documents: Map<String, Value>,
}

/// Response body for POST /commit.
#[derive(Debug, Serialize)]
pub struct CommitResponse<K> {
    /// The new current version.
    pub version_id: String,
    /// The artifact as committed.
    pub artifact: K,
}

/// Response body for GET /versions.
#[derive(Debug, Serialize)]
pub struct VersionsResponse {
    /// Every version, newest first.
    pub versions: Vec<VersionMetadata>,
}

/// Response body for POST /reconcile.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// The version now current; null for an empty chain.
    pub version_id: Option<String>,
}

fn not_found<K: KindServices>(what: &str) -> ApiError {
    ApiError::NotFound(format!("no {} {what}", K::KIND.display_name()))
}

/// GET /
#[instrument(skip_all, fields(kind = %K::KIND, correlation_id = caller.correlation_id()))]
async fn current<K: KindServices>(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<K>, ApiError> {
    query_handlers::get_current(&caller, K::store(&state))
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<K>("has been committed"))
}

/// GET /versions
#[instrument(skip_all, fields(kind = %K::KIND, correlation_id = caller.correlation_id()))]
async fn versions<K: KindServices>(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<VersionsResponse>, ApiError> {
    let versions = query_handlers::list_versions(&caller, K::store(&state)).await?;
    Ok(Json(VersionsResponse { versions }))
}

/// GET /versions/{version_id}
#[instrument(
    skip_all,
    fields(kind = %K::KIND, correlation_id = caller.correlation_id(), version_id = %version_id)
)]
async fn version<K: KindServices>(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(version_id): Path<String>,
) -> Result<Json<K>, ApiError> {
    query_handlers::get_version(&caller, &version_id, K::store(&state))
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<K>(&format!("version {version_id}")))
}

/// POST /propose-merge
#[instrument(skip_all, fields(kind = %K::KIND, correlation_id = caller.correlation_id()))]
async fn propose_merge<K: KindServices>(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<ProposeMergeRequest>,
) -> Result<Json<Proposal<K>>, ApiError> {
    let command = ProposeMerge::new(caller, request.raw_input);

    info!("handling propose_merge command");

    let proposal =
        handle_propose_merge(&command, K::store(&state), K::proposals(&state)).await?;

    Ok(Json(proposal))
}

/// POST /commit
#[instrument(skip_all, fields(kind = %K::KIND, correlation_id = caller.correlation_id()))]
async fn commit<K: KindServices>(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(mut request): Json<CommitRequest>,
) -> Result<Json<CommitResponse<K>>, ApiError> {
    let key = K::KIND.document_key();
    let document = request.documents.remove(key).ok_or_else(|| {
        DomainError::InvalidInput(format!("request body must contain `{key}`"))
    })?;
    let artifact: K = serde_json::from_value(document)
        .map_err(|e| DomainError::InvalidInput(format!("`{key}` is not a valid document: {e}")))?;

    let command = CommitArtifact {
        context: caller,
        artifact,
        expected_version_id: request.expected_version_id,
    };

    info!("handling commit command");

    let metadata = command_handlers::handle_commit_artifact(&command, K::store(&state)).await?;

    Ok(Json(CommitResponse {
        version_id: metadata.version_id,
        artifact: command.artifact,
    }))
}

/// POST /reconcile
#[instrument(skip_all, fields(kind = %K::KIND, correlation_id = caller.correlation_id()))]
async fn reconcile<K: KindServices>(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let version_id = query_handlers::reconcile_current(&caller, K::store(&state)).await?;
    Ok(Json(ReconcileResponse { version_id }))
}

/// Base path the routes for `K` are nested under.
#[must_use]
pub fn base_path<K: KindServices>() -> String {
    format!("/api/v1/{}", K::KIND.kind_segment())
}

/// Returns the router for artifact kind `K`.
pub fn router<K: KindServices>() -> Router<AppState> {
    Router::new()
        .route("/", get(current::<K>))
        .route("/versions", get(versions::<K>))
        .route("/versions/{version_id}", get(version::<K>))
        .route("/propose-merge", post(propose_merge::<K>))
        .route("/commit", post(commit::<K>))
        .route("/reconcile", post(reconcile::<K>))
}
