//! Axum route handlers for the document and editor APIs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::document::{bind, BoundDocument, CanonicalDocument, EditInstruction, FieldDelta};
use crate::editor::session::{SaveFailure, SessionSnapshot};
use crate::errors::AppError;
use crate::models::record::ResumeRecord;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub record: ResumeRecord,
    /// Raw template structure. Omit for a résumé without a template.
    pub structure: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub document: std::sync::Arc<CanonicalDocument>,
    /// The payload handed to persistence; `null` when the edit changed nothing.
    pub delta: Option<FieldDelta>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/normalize
///
/// Stateless: flattens a record and binds it to a template structure.
pub async fn handle_normalize(Json(req): Json<NormalizeRequest>) -> Json<BoundDocument> {
    Json(bind(&req.record, req.structure.as_ref()))
}

/// POST /api/v1/resumes/:id/session
pub async fn handle_open_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state.sessions.open(state.store.clone(), id).await?;
    Ok(Json(snapshot))
}

/// DELETE /api/v1/resumes/:id/session
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.close(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/document
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.snapshot(id).await?))
}

/// POST /api/v1/resumes/:id/edits
///
/// Applies the edit and returns immediately; the save runs in the background.
pub async fn handle_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(instr): Json<EditInstruction>,
) -> Result<Json<EditResponse>, AppError> {
    let outcome = state.sessions.edit(id, instr).await?;
    Ok(Json(EditResponse {
        document: outcome.document,
        delta: outcome.delta,
    }))
}

/// GET /api/v1/resumes/:id/notifications
pub async fn handle_list_failures(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SaveFailure>>, AppError> {
    Ok(Json(state.sessions.failures(id).await?))
}

/// DELETE /api/v1/resumes/:id/notifications/:nid
pub async fn handle_dismiss_failure(
    State(state): State<AppState>,
    Path((id, failure_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.sessions.dismiss(id, failure_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/notifications/:nid/retry
pub async fn handle_retry_failure(
    State(state): State<AppState>,
    Path((id, failure_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.sessions.retry(id, failure_id).await?;
    Ok(StatusCode::ACCEPTED)
}
