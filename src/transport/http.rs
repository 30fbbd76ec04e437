//! Multipart POST to the stitching service over reqwest.

use super::{StitchTransport, StitchedImage, IMAGES_FIELD};
use crate::common::{TransportError, UploadConfig};
use crate::intake::CandidateFile;
use anyhow::{Context, Result};
use reqwest::{header, multipart, Client, Url};
use std::time::Duration;

/// Sends each batch as one `multipart/form-data` request.
#[derive(Clone)]
pub struct HttpStitchTransport {
    client: Client,
    endpoint: Url,
}

impl HttpStitchTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &UploadConfig) -> Result<Self> {
        Self::new(
            config.resolve_endpoint()?,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_form(files: &[CandidateFile]) -> Result<multipart::Form, TransportError> {
        let mut form = multipart::Form::new();
        for file in files {
            let mut part = multipart::Part::stream_with_length(
                reqwest::Body::from(file.contents().clone()),
                file.size(),
            )
            .file_name(file.name().to_string());

            if let Some(mime) = file.content_type() {
                part = part
                    .mime_str(mime)
                    .map_err(|e| TransportError::Request(e.to_string()))?;
            }

            form = form.part(IMAGES_FIELD, part);
        }
        Ok(form)
    }
}

#[async_trait::async_trait]
impl StitchTransport for HttpStitchTransport {
    async fn stitch(&self, files: &[CandidateFile]) -> Result<StitchedImage, TransportError> {
        let form = Self::build_form(files)?;

        tracing::info!(
            endpoint = %self.endpoint,
            files = files.len(),
            "Sending stitch request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Stitch service rejected the batch");
            return Err(TransportError::Rejected {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        tracing::info!(bytes = bytes.len(), "Stitched image received");
        Ok(StitchedImage {
            bytes,
            content_type,
        })
    }
}
