//! Error types for the tracer.

use thiserror::Error;

/// Errors that can occur while configuring or driving a trace session.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Reconfiguration attempted while a trace run owns the ray state.
    #[error("a trace is already running; wait for it to finish before reconfiguring")]
    Busy,

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML for [`TracerConfig`](crate::config::TracerConfig).
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        /// File that could not be parsed.
        path: String,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// The background trace thread panicked.
    #[error("trace worker panicked")]
    WorkerPanicked,
}

/// Result type for tracer operations.
pub type Result<T> = std::result::Result<T, TraceError>;
