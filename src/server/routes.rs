//! Router for the local browser surface.

use super::{handlers, ServerState};
use crate::ui::web;
use axum::{extract::DefaultBodyLimit, routing::*, Router};

const BODY_SLACK_BYTES: u64 = 1024 * 1024;

/// Build the router for the session API and page assets.
pub fn create_router(state: &ServerState) -> Router {
    let body_limit = state
        .config
        .max_total_size_mb
        .saturating_mul(1024 * 1024)
        .saturating_add(BODY_SLACK_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/", get(|| async { web::serve_upload_page() }))
        .route("/upload.js", get(|| async { web::serve_upload_js() }))
        .route("/styles.css", get(|| async { web::serve_styles_css() }))
        .route("/api/session", get(handlers::session_handler))
        .route("/api/files", post(handlers::add_files_handler))
        .route("/api/files/:index", delete(handlers::remove_file_handler))
        .route("/api/submit", post(handlers::submit_handler))
        .route("/api/result", get(handlers::download_result_handler))
        .route("/blobs/:id", get(handlers::blob_handler))
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(body_limit))
}
