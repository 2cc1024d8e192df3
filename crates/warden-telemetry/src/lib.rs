//! Telemetry for the Warden Replica Auditor
//!
//! Structured logging built on `tracing` and `tracing-subscriber`.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LogOutput};

use thiserror::Error;

/// Telemetry error types
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Invalid logging setting
    #[error("Logging error: {0}")]
    Logging(String),

    /// Subscriber installation failed
    #[error("Initialization error: {0}")]
    Init(String),

    /// I/O error opening a log destination
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;
