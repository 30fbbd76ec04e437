use crate::common::UploadConfig;
use crate::session::UploadSession;
use std::sync::Arc;

/// Shared handler state. Cloning shares the one session.
#[derive(Clone)]
pub struct ServerState {
    pub session: Arc<UploadSession>,
    pub config: Arc<UploadConfig>,
}

impl ServerState {
    pub fn new(session: Arc<UploadSession>, config: UploadConfig) -> Self {
        Self {
            session,
            config: Arc::new(config),
        }
    }
}
