//! HTTP handlers for the browser session API.

use super::ServerState;
use crate::common::AppError;
use crate::intake::CandidateFile;
use crate::session::{SessionSnapshot, SubmitOutcome};
use crate::transport::IMAGES_FIELD;
use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart, TypedMultipartError};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Files from either the picker or a drop, sent the same way by the page.
#[derive(TryFromMultipart)]
pub struct IntakeForm {
    #[form_data(field_name = "images[]", limit = "unlimited")]
    pub images: Vec<FieldData<Bytes>>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub submitted: bool,
    pub session: SessionSnapshot,
}

fn candidate_from_part(part: FieldData<Bytes>) -> CandidateFile {
    let name = part
        .metadata
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "unnamed".to_string());

    let file = CandidateFile::new(name, part.contents);
    match part.metadata.content_type {
        Some(content_type) => file.with_content_type(content_type),
        None => file,
    }
}

pub async fn session_handler(State(state): State<ServerState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

/// Body reads cut off by `DefaultBodyLimit` surface as a 413 from multer.
fn exceeds_body_limit(err: &TypedMultipartError) -> bool {
    match err {
        TypedMultipartError::InvalidRequest { source } => {
            source.status() == StatusCode::PAYLOAD_TOO_LARGE
        }
        TypedMultipartError::InvalidRequestBody { source } => {
            source.status() == StatusCode::PAYLOAD_TOO_LARGE
        }
        TypedMultipartError::FieldTooLarge { .. } => true,
        _ => false,
    }
}

/// Run one intake event. Rejections are reported in the snapshot message,
/// including batches too large to be read.
pub async fn add_files_handler(
    State(state): State<ServerState>,
    form: Result<TypedMultipart<IntakeForm>, TypedMultipartError>,
) -> Result<Json<SessionSnapshot>, Response> {
    let form = match form {
        Ok(TypedMultipart(form)) => form,
        Err(err) if exceeds_body_limit(&err) => {
            state.session.reject_oversized();
            return Ok(Json(state.session.snapshot()));
        }
        Err(err) => return Err(err.into_response()),
    };
    tracing::debug!(field = IMAGES_FIELD, parts = form.images.len(), "intake");

    let candidates = form.images.into_iter().map(candidate_from_part).collect();
    state.session.add_files(candidates);
    Ok(Json(state.session.snapshot()))
}

pub async fn remove_file_handler(
    State(state): State<ServerState>,
    Path(index): Path<usize>,
) -> Json<SessionSnapshot> {
    state.session.remove_file(index);
    Json(state.session.snapshot())
}

/// Submit runs on its own task so a dropped connection cannot cancel it.
pub async fn submit_handler(
    State(state): State<ServerState>,
) -> Result<Json<SubmitResponse>, AppError> {
    let session = Arc::clone(&state.session);
    let outcome = tokio::spawn(async move { session.submit().await })
        .await
        .context("Submit task failed")?;

    Ok(Json(SubmitResponse {
        submitted: outcome != SubmitOutcome::Skipped,
        session: state.session.snapshot(),
    }))
}

/// Serve a live preview or result handle.
pub async fn blob_handler(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let blob = state
        .session
        .blobs()
        .resolve(&id)
        .ok_or_else(|| AppError::NotFound(format!("blob {id} not found")))?;

    let content_type = blob
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        blob.bytes,
    )
        .into_response())
}

/// Result as a download under the configured fixed name.
pub async fn download_result_handler(
    State(state): State<ServerState>,
) -> Result<Response, AppError> {
    let blob = state
        .session
        .result()
        .ok_or_else(|| AppError::NotFound("no stitched result".to_string()))?;

    let content_type = blob
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let disposition = format!("attachment; filename=\"{}\"", state.config.download_name);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        blob.bytes,
    )
        .into_response())
}
