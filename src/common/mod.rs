pub mod config;
pub mod config_commands;
pub mod errors;

pub use config::{ConfigOverrides, UploadConfig};
pub use errors::{AppError, IntakeError, TransportError, ValidationError, ValidationWarning};
