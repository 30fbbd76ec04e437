// Submodules
pub mod handlers;
mod local;
pub mod routes;
mod runtime;
mod state;

// Public API (what main.rs imports)
pub use local::start_local_server;
pub use runtime::{run_browser_session, serve_until};
pub use state::ServerState;
