// src/utils/errors.rs
//! Error types for the interception engine
//!
//! Construction-time failures (plugin lookup, protocol factories, log I/O)
//! surface through `SnifferError`. Failures inside a running direction worker
//! never cross a task boundary as an error: the worker logs a diagnostic and
//! marks its interceptor for reclamation instead.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, SnifferError>;

/// Errors surfaced by the interception engine
#[derive(Debug, Error)]
pub enum SnifferError {
    /// No plugin registered under the requested name
    #[error("no plugin registered under name '{name}'")]
    PluginNotFound { name: String },

    /// A protocol factory rejected the supplied options
    #[error("protocol construction failed: {0}")]
    ProtocolConstruction(String),

    /// Writing a record to the shared log sink failed
    #[error("log write failed: {0}")]
    LogWrite(#[from] std::io::Error),

    /// The controller no longer accepts new interceptors
    #[error("controller is shutting down")]
    ShuttingDown,
}
