//! Displayable resource handles for previews and stitched results.
//!
//! A `BlobHandle` is the only owner of its store entry. The entry stays
//! resolvable through `/blobs/<id>` until the handle is dropped.

use bytes::Bytes;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Binary data plus the content type it should be served with.
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Process-local registry of live blobs. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    entries: Arc<DashMap<Uuid, Blob>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blob and returns the handle that keeps it alive.
    pub fn register(&self, bytes: Bytes, content_type: Option<String>) -> BlobHandle {
        let id = Uuid::new_v4();
        self.entries.insert(
            id,
            Blob {
                bytes,
                content_type,
            },
        );
        tracing::trace!(%id, "blob registered");
        BlobHandle {
            id,
            entries: Arc::clone(&self.entries),
        }
    }

    /// Resolves a live handle id. Released ids return `None`.
    pub fn resolve(&self, id: &Uuid) -> Option<Blob> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}

/// Owning reference to a registered blob. Dropping it releases the blob.
pub struct BlobHandle {
    id: Uuid,
    entries: Arc<DashMap<Uuid, Blob>>,
}

impl BlobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Locally resolvable URL, served by the browser surface.
    pub fn url(&self) -> String {
        format!("/blobs/{}", self.id)
    }
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        self.entries.remove(&self.id);
        tracing::trace!(id = %self.id, "blob released");
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobHandle").field("id", &self.id).finish()
    }
}
