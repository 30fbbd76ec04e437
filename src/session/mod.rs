//! Upload session manager: one accepted set, one message, one submit gate.

pub mod handles;
pub mod state;
pub mod validator;

pub use handles::{Blob, BlobHandle, BlobStore};
pub use state::{
    AcceptedFile, AddOutcome, FileSummary, Message, MessageKind, Notice, SessionSnapshot,
    SessionState, Status,
};
pub use validator::{validate, Admission, Limits};

use crate::common::TransportError;
use crate::intake::CandidateFile;
use crate::transport::StitchTransport;
use std::sync::{Arc, Mutex, MutexGuard};

/// How a `submit` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to send, or another submit holds the gate.
    Skipped,
    Stitched,
    Failed(TransportError),
}

/// Single owner of the session state. All mutation goes through
/// `add_files`, `remove_file`, and `submit`.
pub struct UploadSession {
    state: Mutex<SessionState>,
    transport: Arc<dyn StitchTransport>,
    blobs: BlobStore,
}

impl UploadSession {
    pub fn new(limits: Limits, transport: Arc<dyn StitchTransport>) -> Self {
        let blobs = BlobStore::new();
        Self {
            state: Mutex::new(SessionState::new(limits, blobs.clone())),
            transport,
            blobs,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Session lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn add_files(&self, candidates: Vec<CandidateFile>) -> AddOutcome {
        self.lock().add_files(candidates)
    }

    /// Records a batch that could not be read because it exceeds the size ceiling.
    pub fn reject_oversized(&self) -> AddOutcome {
        self.lock().reject_oversized()
    }

    pub fn remove_file(&self, index: usize) -> Option<CandidateFile> {
        self.lock().remove_file(index)
    }

    /// Sends the accepted set once. A call made while another is in flight,
    /// or with nothing accepted, returns `Skipped` without touching the network.
    pub async fn submit(&self) -> SubmitOutcome {
        let files = {
            let mut state = self.lock();
            state.begin_submit()
        };
        let Some(files) = files else {
            tracing::debug!("Submit skipped: nothing accepted or upload in flight");
            return SubmitOutcome::Skipped;
        };

        let mut in_flight = InFlight {
            session: self,
            settled: false,
        };

        tracing::info!(files = files.len(), "Submitting batch");
        let outcome = self.transport.stitch(&files).await;

        let summary = match &outcome {
            Ok(_) => SubmitOutcome::Stitched,
            Err(err) => SubmitOutcome::Failed(err.clone()),
        };
        self.lock().finish_submit(outcome);
        in_flight.settled = true;

        summary
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn status(&self) -> Status {
        self.lock().status()
    }

    pub fn message(&self) -> Option<String> {
        self.lock().notice().map(ToString::to_string)
    }

    pub fn accepted_names(&self) -> Vec<String> {
        self.lock()
            .accepted()
            .iter()
            .map(|a| a.file().name().to_string())
            .collect()
    }

    /// The current result blob, if one is held.
    pub fn result(&self) -> Option<Blob> {
        let state = self.lock();
        state.result().and_then(|handle| self.blobs.resolve(&handle.id()))
    }

    /// Registry backing preview and result URLs.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }
}

/// Reopens the gate if a submit future is dropped mid-request.
struct InFlight<'a> {
    session: &'a UploadSession,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.lock().abandon_submit();
        }
    }
}
