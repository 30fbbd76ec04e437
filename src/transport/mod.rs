//! Transport adapter between the session and the stitching service.

mod http;

pub use http::HttpStitchTransport;

use crate::common::TransportError;
use crate::intake::CandidateFile;
use bytes::Bytes;

/// Multipart field name repeated once per uploaded image.
pub const IMAGES_FIELD: &str = "images[]";

/// Body of a successful stitch response.
#[derive(Debug, Clone)]
pub struct StitchedImage {
    pub bytes: Bytes,
    /// Content type reported by the service, if any. Never interpreted.
    pub content_type: Option<String>,
}

/// One attempt at turning a batch into a composite image.
///
/// Implementations make exactly one request per call and never retry.
#[async_trait::async_trait]
pub trait StitchTransport: Send + Sync {
    async fn stitch(&self, files: &[CandidateFile]) -> Result<StitchedImage, TransportError>;
}
