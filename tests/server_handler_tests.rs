mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use common::{MockTransport, STITCHED};
use panodrop::common::UploadConfig;
use panodrop::server::{routes::create_router, ServerState};
use panodrop::session::UploadSession;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "panodrop-test-boundary";

fn app_with_config(transport: MockTransport, config: UploadConfig) -> Router {
    let session = Arc::new(UploadSession::new(config.limits(), Arc::new(transport)));
    create_router(&ServerState::new(session, config))
}

fn app_with(transport: MockTransport, image_limit: usize) -> Router {
    app_with_config(
        transport,
        UploadConfig {
            image_limit,
            ..UploadConfig::default()
        },
    )
}

fn app() -> Router {
    app_with(MockTransport::ok(), 2)
}

fn multipart_body(files: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, contents) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"images[]\"; filename=\"{name}\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("request")
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).expect("request")).await
}

async fn add_files(app: &Router, files: &[(&str, &str)]) -> Value {
    let request = Request::post("/api/files")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(files)))
        .expect("request");
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    json(response).await
}

async fn call(app: &Router, method: Method, uri: &str) -> Value {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    json(response).await
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable")
        .to_vec()
}

async fn json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

fn file_names(snapshot: &Value) -> Vec<String> {
    snapshot["files"]
        .as_array()
        .expect("files array")
        .iter()
        .map(|f| f["name"].as_str().expect("name").to_string())
        .collect()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let response = get(&app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn fresh_session_is_empty_and_idle() {
    let snapshot = call(&app(), Method::GET, "/api/session").await;

    assert_eq!(file_names(&snapshot), Vec::<String>::new());
    assert_eq!(snapshot["status"], "idle");
    assert!(snapshot["message"].is_null());
    assert!(snapshot["result_url"].is_null());
    assert_eq!(snapshot["limits"]["max_files"], 2);
}

#[tokio::test]
async fn added_files_get_resolvable_previews() {
    let app = app();

    let snapshot = add_files(&app, &[("left.jpg", "left-bytes"), ("right.jpg", "right")]).await;

    assert_eq!(file_names(&snapshot), vec!["left.jpg", "right.jpg"]);
    assert_eq!(snapshot["total_bytes"], 15);

    let preview_url = snapshot["files"][0]["preview_url"]
        .as_str()
        .expect("preview url");
    let response = get(&app, preview_url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("content type"),
        "image/jpeg"
    );
    assert_eq!(body_bytes(response).await, b"left-bytes");
}

#[tokio::test]
async fn rejected_batch_reports_message() {
    let app = app();
    add_files(&app, &[("a.jpg", "a"), ("b.jpg", "bb")]).await;

    let snapshot = add_files(&app, &[("c.jpg", "ccc")]).await;

    assert_eq!(file_names(&snapshot), vec!["a.jpg", "b.jpg"]);
    assert_eq!(snapshot["message"]["kind"], "error");
    assert_eq!(snapshot["message"]["text"], "Max 2 images allowed.");
}

#[tokio::test]
async fn batch_over_body_limit_reports_size_message() {
    let app = app_with_config(
        MockTransport::ok(),
        UploadConfig {
            max_total_size_mb: 1,
            ..UploadConfig::default()
        },
    );
    add_files(&app, &[("a.jpg", "a")]).await;
    let snapshot = add_files(&app, &[("a.jpg", "a")]).await;
    assert_eq!(snapshot["message"]["kind"], "warning");

    let oversized = "x".repeat(3 * common::MB);
    let snapshot = add_files(&app, &[("huge.jpg", oversized.as_str())]).await;

    assert_eq!(file_names(&snapshot), vec!["a.jpg"]);
    assert_eq!(snapshot["message"]["kind"], "error");
    assert_eq!(snapshot["message"]["text"], "Max total size is 1 MB.");
}

#[tokio::test]
async fn duplicate_batch_reports_warning() {
    let app = app();
    add_files(&app, &[("a.jpg", "a")]).await;

    let snapshot = add_files(&app, &[("a.jpg", "a")]).await;

    assert_eq!(file_names(&snapshot), vec!["a.jpg"]);
    assert_eq!(snapshot["message"]["kind"], "warning");
    assert_eq!(
        snapshot["message"]["text"],
        "Some duplicate images were skipped."
    );
}

#[tokio::test]
async fn removed_file_releases_its_preview() {
    let app = app();
    let snapshot = add_files(&app, &[("a.jpg", "a"), ("b.jpg", "b")]).await;
    let preview_url = snapshot["files"][0]["preview_url"]
        .as_str()
        .expect("preview url")
        .to_string();

    let snapshot = call(&app, Method::DELETE, "/api/files/0").await;

    assert_eq!(file_names(&snapshot), vec!["b.jpg"]);
    assert_eq!(get(&app, &preview_url).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remove_out_of_range_leaves_set_unchanged() {
    let app = app();
    add_files(&app, &[("a.jpg", "a")]).await;

    let snapshot = call(&app, Method::DELETE, "/api/files/7").await;

    assert_eq!(file_names(&snapshot), vec!["a.jpg"]);
}

#[tokio::test]
async fn submit_exposes_result_for_download() {
    let app = app();
    add_files(&app, &[("a.jpg", "a"), ("b.jpg", "b")]).await;

    let response = call(&app, Method::POST, "/api/submit").await;

    assert_eq!(response["submitted"], true);
    assert_eq!(response["session"]["status"], "idle");
    let result_url = response["session"]["result_url"]
        .as_str()
        .expect("result url");

    let preview = get(&app, result_url).await;
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(body_bytes(preview).await, STITCHED);

    let download = get(&app, "/api/result").await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(
        download
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .expect("content disposition"),
        "attachment; filename=\"panorama.webp\""
    );
    assert_eq!(
        download.headers().get(header::CONTENT_TYPE).expect("content type"),
        "image/webp"
    );
    assert_eq!(body_bytes(download).await, STITCHED);
}

#[tokio::test]
async fn failed_submit_reports_error_message() {
    let app = app_with(MockTransport::rejecting(500), 16);
    add_files(&app, &[("a.jpg", "a")]).await;

    let response = call(&app, Method::POST, "/api/submit").await;

    assert_eq!(response["submitted"], true);
    assert_eq!(response["session"]["message"]["kind"], "error");
    assert_eq!(
        response["session"]["message"]["text"],
        "Error: Failed to stitch image"
    );
    assert!(response["session"]["result_url"].is_null());
    assert_eq!(file_names(&response["session"]), vec!["a.jpg"]);
}

#[tokio::test]
async fn submit_with_nothing_accepted_is_not_sent() {
    let response = call(&app(), Method::POST, "/api/submit").await;
    assert_eq!(response["submitted"], false);
}

#[tokio::test]
async fn result_download_is_not_found_before_submit() {
    let response = get(&app(), "/api/result").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_blob_is_not_found() {
    let response = get(&app(), "/blobs/00000000-0000-0000-0000-000000000000").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_page_is_served_at_root() {
    let response = get(&app(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(String::from_utf8(body_bytes(response).await)
        .expect("utf8")
        .contains("upload.js"));
}
