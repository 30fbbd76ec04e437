#![allow(dead_code)]

pub mod config_test_utils;

use async_trait::async_trait;
use axum::{
    extract::Multipart,
    http::{header, StatusCode},
    routing::post,
    Router,
};
use bytes::Bytes;
use panodrop::common::TransportError;
use panodrop::intake::CandidateFile;
use panodrop::session::Limits;
use panodrop::transport::{StitchTransport, StitchedImage};
use reqwest::Url;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const MB: usize = 1024 * 1024;
pub const STITCHED: &[u8] = b"RIFF\0\0\0\0WEBPstitched";

pub fn limits(max_files: usize, max_total_size_mb: u64) -> Limits {
    Limits {
        max_files,
        max_total_size_mb,
    }
}

pub fn image(name: &str, size: usize) -> CandidateFile {
    CandidateFile::new(name, vec![0u8; size])
}

/// In-process transport that records every exchange.
pub struct MockTransport {
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
    response: Result<StitchedImage, TransportError>,
    started: Notify,
    gate: Option<Notify>,
}

impl MockTransport {
    fn new(response: Result<StitchedImage, TransportError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
            response,
            started: Notify::new(),
            gate: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(Ok(StitchedImage {
            bytes: Bytes::from_static(STITCHED),
            content_type: Some("image/webp".to_string()),
        }))
    }

    pub fn rejecting(status: u16) -> Self {
        Self::new(Err(TransportError::Rejected { status }))
    }

    /// Holds every exchange open until `release` is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Resolves once an exchange has started.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().expect("batches lock").clone()
    }
}

#[async_trait]
impl StitchTransport for MockTransport {
    async fn stitch(&self, files: &[CandidateFile]) -> Result<StitchedImage, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .expect("batches lock")
            .push(files.iter().map(|f| f.name().to_string()).collect());
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.response.clone()
    }
}

/// One multipart part as seen by the mock stitching service.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

pub struct StitchServer {
    pub url: Url,
    pub requests: Arc<Mutex<Vec<Vec<ReceivedPart>>>>,
}

impl StitchServer {
    pub fn requests(&self) -> Vec<Vec<ReceivedPart>> {
        self.requests.lock().expect("requests lock").clone()
    }
}

/// Starts a stitching service on loopback that answers every request
/// with `status` and `body`.
pub async fn spawn_stitch_server(status: StatusCode, body: &'static [u8]) -> StitchServer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&requests);

    let app = Router::new().route(
        "/api/stitch",
        post(move |mut multipart: Multipart| {
            let captured = Arc::clone(&captured);
            async move {
                let mut parts = Vec::new();
                while let Ok(Some(field)) = multipart.next_field().await {
                    let field_name = field.name().unwrap_or_default().to_string();
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                    parts.push(ReceivedPart {
                        field: field_name,
                        file_name,
                        content_type,
                        len,
                    });
                }
                captured.lock().expect("requests lock").push(parts);
                (status, [(header::CONTENT_TYPE, "image/webp")], body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock stitch server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock stitch server");
    });

    StitchServer {
        url: Url::parse(&format!("http://{addr}/api/stitch")).expect("mock url"),
        requests,
    }
}
