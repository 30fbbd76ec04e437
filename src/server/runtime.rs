//! Runtime lifecycle: start the browser surface, wait for Ctrl+C, shut down.

use super::{local::start_local_server, routes, ServerState};
use crate::common::UploadConfig;
use crate::session::UploadSession;
use crate::output;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Serve one session until Ctrl+C.
pub async fn run_browser_session(session: Arc<UploadSession>, config: UploadConfig) -> Result<()> {
    let token = CancellationToken::new();

    let signal_token = token.clone();
    let ctrl_c_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Ctrl+C received - shutting down");
        signal_token.cancel();
    });

    let result = serve_until(session, config, token).await;

    ctrl_c_task.abort();
    let _ = ctrl_c_task.await;
    result
}

/// Serve until `token` is cancelled, then drain connections.
pub async fn serve_until(
    session: Arc<UploadSession>,
    config: UploadConfig,
    token: CancellationToken,
) -> Result<()> {
    let port = config.server.port;
    let state = ServerState::new(session, config);
    let app = routes::create_router(&state);

    let (port, server_handle) = start_local_server(app, port)?;
    let url = format!("http://127.0.0.1:{port}/");
    tracing::info!(%url, "Upload page ready");
    output::announce_url(&url);

    token.cancelled().await;

    server_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    tracing::info!("Server shutdown complete");
    Ok(())
}
