//! Selection intake: picker and drop events normalized into candidate files.
//!
//! Whatever the source, intake yields the same shape: an ordered
//! `Vec<CandidateFile>` in the order the user selected or dropped them.

mod drop;
mod picker;

pub use drop::parse_drop_payload;
pub use picker::read_paths;

use crate::common::IntakeError;
use bytes::Bytes;
use std::path::PathBuf;

/// A file offered for the batch but not yet accepted.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    name: String,
    size: u64,
    content_type: Option<String>,
    contents: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        let name = name.into();
        let contents = contents.into();
        Self {
            content_type: guess_content_type(&name).map(str::to_string),
            size: contents.len() as u64,
            name,
            contents,
        }
    }

    /// Replaces the extension-based guess with a declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn contents(&self) -> &Bytes {
        &self.contents
    }

    /// Duplicate identity: same name and same size. Contents are never compared.
    pub fn same_identity(&self, other: &CandidateFile) -> bool {
        self.name == other.name && self.size == other.size
    }
}

/// One user intake event.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Paths chosen explicitly (CLI arguments, `add` in the shell).
    Picked(Vec<PathBuf>),
    /// Text dropped onto the terminal: quoted paths or `file://` URIs.
    Dropped(String),
}

impl Selection {
    /// Reads every entry of the event, in order. Any unreadable entry fails
    /// the whole event.
    pub async fn collect(&self) -> Result<Vec<CandidateFile>, IntakeError> {
        match self {
            Selection::Picked(paths) => read_paths(paths).await,
            Selection::Dropped(payload) => {
                let paths = parse_drop_payload(payload);
                tracing::debug!(count = paths.len(), "parsed drop payload");
                read_paths(&paths).await
            }
        }
    }
}

fn guess_content_type(name: &str) -> Option<&'static str> {
    let extension = name.rsplit_once('.')?.1.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(content_type)
}
