//! Loopback listener for the browser surface.

use anyhow::{Context, Result};
use std::net::{SocketAddr, TcpListener};

fn bind_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Starts an Axum server on loopback and returns `(bound_port, handle)`.
pub fn start_local_server(app: axum::Router, port: u16) -> Result<(u16, axum_server::Handle)> {
    let listener = TcpListener::bind(bind_addr(port)).context(
        "Failed to bind to port - port already in use.\n\n\
         Is another panodrop instance running?\n\
         Or is another service using this port?",
    )?;

    listener
        .set_nonblocking(true)
        .context("Failed to set listener to non-blocking mode")?;

    let port = listener.local_addr()?.port();

    let server_handle = axum_server::Handle::new();
    let server_handle_clone = server_handle.clone();

    tokio::spawn(async move {
        if let Err(e) = axum_server::from_tcp(listener)
            .handle(server_handle_clone)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((port, server_handle))
}
