//! auditview utilities
//!
//! Shared plumbing for the auditview crates: logging initialization on top
//! of `tracing`, layered configuration loading, and the error type both use.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod logging;

pub use config::{default_config_path, load_config, merge_configs, save_config, ConfigBuilder};
pub use logging::{get_logger, init_logging, LogLevel, Logger, LoggerConfig};

/// Result type used throughout auditview utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}
