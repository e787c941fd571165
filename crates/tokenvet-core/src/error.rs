//! Error types for resource failures.
//!
//! Format and security-policy violations never reach this type: they are
//! resolved locally into a `valid: false` [`crate::Validation`]. Only
//! genuinely exceptional conditions (missing files, oversize files, JSON
//! syntax errors at the read boundary, I/O failures) surface here, with
//! stable message prefixes a caller can pattern-match or display.

use std::path::PathBuf;

/// Resource errors raised by the file-reading validators.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The requested file does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The file exceeds the configured byte ceiling.
    #[error("File too large: {path} ({size} bytes, max {max})")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max: u64,
    },

    /// The file is not well-formed JSON.
    #[error("Invalid JSON in {file}: {message}")]
    Json { file: String, message: String },

    /// Underlying I/O failure (permissions, transient read errors).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ValidatorError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 1,
            Self::FileTooLarge { .. } => 1,
            Self::Json { .. } => 1,
            Self::Io(_) => 2,
        }
    }
}

/// Result type for resource-touching operations.
pub type ValidatorResult<T> = Result<T, ValidatorError>;
