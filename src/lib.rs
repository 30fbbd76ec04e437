pub mod common;
pub mod intake;
pub mod output;
pub mod server;
pub mod session;
pub mod transport;
pub mod ui;
