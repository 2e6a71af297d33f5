//! Error types for floatterm.

use thiserror::Error;

use crate::process::JobId;

/// Main error type for floatterm operations.
#[derive(Error, Debug)]
pub enum FloatTermError {
    /// PTY-related error.
    #[error("PTY error: {0}")]
    Pty(String),

    /// A process could not be started.
    #[error("failed to start `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    /// The windowing surface rejected an operation.
    #[error("surface error: {0}")]
    Surface(String),

    /// Job is not known to the process facility.
    #[error("unknown job: {0}")]
    UnknownJob(JobId),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for floatterm operations.
pub type Result<T> = std::result::Result<T, FloatTermError>;
