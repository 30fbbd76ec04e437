//! Session record and the synchronous transitions applied to it.

use super::handles::{BlobHandle, BlobStore};
use super::validator::{validate, Limits};
use crate::common::{TransportError, ValidationError, ValidationWarning};
use crate::intake::CandidateFile;
use crate::transport::StitchedImage;
use serde::Serialize;
use std::fmt;

/// Submit gate. Only one stitch request may be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Uploading,
}

/// The single message shown to the user. A new one replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(ValidationWarning),
    Rejected(ValidationError),
    Failed(TransportError),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Warning(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Warning(warning) => write!(f, "{warning}"),
            Notice::Rejected(err) => write!(f, "{err}"),
            Notice::Failed(err) => write!(f, "Error: {err}"),
        }
    }
}

/// An accepted file and the preview handle created when it was admitted.
#[derive(Debug)]
pub struct AcceptedFile {
    file: CandidateFile,
    preview: BlobHandle,
}

impl AcceptedFile {
    pub fn file(&self) -> &CandidateFile {
        &self.file
    }

    pub fn preview(&self) -> &BlobHandle {
        &self.preview
    }
}

/// Result of one add/validate cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Admitted {
        count: usize,
        warning: Option<ValidationWarning>,
    },
    Rejected(ValidationError),
}

/// Mutable session record. Owned by `UploadSession`.
#[derive(Debug)]
pub struct SessionState {
    accepted: Vec<AcceptedFile>,
    status: Status,
    notice: Option<Notice>,
    result: Option<BlobHandle>,
    limits: Limits,
    blobs: BlobStore,
}

impl SessionState {
    pub fn new(limits: Limits, blobs: BlobStore) -> Self {
        Self {
            accepted: Vec::new(),
            status: Status::Idle,
            notice: None,
            result: None,
            limits,
            blobs,
        }
    }

    /// Validates a batch and appends what survives.
    pub fn add_files(&mut self, candidates: Vec<CandidateFile>) -> AddOutcome {
        let incoming = candidates.len();
        let existing = self.accepted.iter().map(AcceptedFile::file);

        match validate(candidates, existing, &self.limits) {
            Ok(admission) => {
                let count = admission.admitted.len();
                for file in admission.admitted {
                    let preview = self
                        .blobs
                        .register(file.contents().clone(), file.content_type().map(str::to_string));
                    self.accepted.push(AcceptedFile { file, preview });
                }
                self.result = None;
                self.notice = admission.warning.map(Notice::Warning);

                tracing::debug!(
                    incoming,
                    admitted = count,
                    total = self.accepted.len(),
                    "Batch admitted"
                );
                AddOutcome::Admitted {
                    count,
                    warning: admission.warning,
                }
            }
            Err(err) => {
                tracing::warn!(incoming, reason = %err, "Batch rejected");
                self.reject(err)
            }
        }
    }

    /// Rejects a batch too large to read at all. Same outcome as a batch that
    /// fails the size ceiling.
    pub fn reject_oversized(&mut self) -> AddOutcome {
        tracing::warn!(limit_mb = self.limits.max_total_size_mb, "Batch rejected before intake");
        self.reject(ValidationError::TooLarge {
            limit_mb: self.limits.max_total_size_mb,
        })
    }

    fn reject(&mut self, err: ValidationError) -> AddOutcome {
        self.notice = Some(Notice::Rejected(err.clone()));
        AddOutcome::Rejected(err)
    }

    /// Removes the file at `index`, releasing its preview. Out of range is a no-op.
    pub fn remove_file(&mut self, index: usize) -> Option<CandidateFile> {
        if index >= self.accepted.len() {
            tracing::debug!(index, len = self.accepted.len(), "Remove ignored: out of range");
            return None;
        }

        let AcceptedFile { file, preview } = self.accepted.remove(index);
        drop(preview);
        self.notice = None;
        Some(file)
    }

    /// Closes the gate and hands out the batch to send. `None` when the set is
    /// empty or a submit is already in flight.
    pub fn begin_submit(&mut self) -> Option<Vec<CandidateFile>> {
        if self.accepted.is_empty() || self.status == Status::Uploading {
            return None;
        }

        self.status = Status::Uploading;
        self.result = None;
        self.notice = None;
        Some(self.accepted.iter().map(|a| a.file.clone()).collect())
    }

    /// Applies the transport outcome and reopens the gate.
    pub fn finish_submit(&mut self, outcome: Result<StitchedImage, TransportError>) {
        match outcome {
            Ok(image) => {
                self.result = Some(self.blobs.register(image.bytes, image.content_type));
            }
            Err(err) => {
                tracing::warn!(error = %err, "Stitch request failed");
                self.notice = Some(Notice::Failed(err));
            }
        }
        self.status = Status::Idle;
    }

    /// Reopens the gate when a submit ends without an outcome.
    pub(crate) fn abandon_submit(&mut self) {
        if self.status == Status::Uploading {
            tracing::warn!("Submit dropped before completion");
            self.status = Status::Idle;
        }
    }

    pub fn accepted(&self) -> &[AcceptedFile] {
        &self.accepted
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn result(&self) -> Option<&BlobHandle> {
        self.result.as_ref()
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn total_bytes(&self) -> u64 {
        self.accepted.iter().map(|a| a.file.size()).sum()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            files: self
                .accepted
                .iter()
                .enumerate()
                .map(|(index, accepted)| FileSummary {
                    index,
                    name: accepted.file.name().to_string(),
                    size: accepted.file.size(),
                    preview_url: accepted.preview.url(),
                })
                .collect(),
            status: self.status,
            message: self.notice.as_ref().map(|notice| Message {
                kind: if notice.is_error() {
                    MessageKind::Error
                } else {
                    MessageKind::Warning
                },
                text: notice.to_string(),
            }),
            result_url: self.result.as_ref().map(BlobHandle::url),
            total_bytes: self.total_bytes(),
            limits: self.limits,
        }
    }
}

/// Serializable view rendered by the terminal and browser surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub files: Vec<FileSummary>,
    pub status: Status,
    pub message: Option<Message>,
    pub result_url: Option<String>,
    pub total_bytes: u64,
    pub limits: Limits,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub preview_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}
