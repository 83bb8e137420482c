//! Error types and error handling for the quarry search engine.
//!
//! Per-file failures (`DecodeError`) are logged by the pipeline and
//! never abort a run. Configuration and persistence failures are
//! surfaced to the caller with enough context to replay.

use thiserror::Error;

/// Result type alias for quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Main error type for the quarry engine
#[derive(Error, Debug)]
pub enum QuarryError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to decode {path}: {message}")]
    DecodeError { path: String, message: String },

    #[error("Persistence failed ({} documents pending): {message}", pending.len())]
    PersistenceError {
        message: String,
        /// Paths of the documents retained for retry
        pending: Vec<String>,
    },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl QuarryError {
    /// Shorthand for a decode failure on `path`
    pub fn decode(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        QuarryError::DecodeError {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuarryError::NotFound(_))
    }

    /// Check if this error ends an indexing run
    ///
    /// Decode errors are scoped to a single file; everything else
    /// stops the run or is reported to the operator.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, QuarryError::DecodeError { .. })
    }

    /// Paths retained for retry, if this is a persistence failure
    pub fn pending_paths(&self) -> &[String] {
        match self {
            QuarryError::PersistenceError { pending, .. } => pending,
            _ => &[],
        }
    }
}
