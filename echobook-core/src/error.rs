//! Error types
//!
//! `EchoError` covers the pipeline's own failures (files, JSON, configuration).
//! `ServiceError` covers the external translation and speech collaborators; those
//! failures are recorded per unit and never abort a batch.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pipeline-level errors
#[derive(Error, Debug)]
pub enum EchoError {
    /// I/O error on a specific path
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file or directory being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error on a specific path
    #[error("JSON error in {path}: {source}")]
    Json {
        /// The file being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Language code not of the form `xx-XX`
    #[error("invalid language code '{0}' (expected pattern xx-XX)")]
    InvalidLanguage(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Language with no known display name
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    /// Title list did not line up with the book text
    #[error("marker titles mismatch: not found {missing:?}, found more than once {duplicated:?}")]
    MarkerTitles {
        /// Titles that never appeared on their own line
        missing: Vec<String>,
        /// Titles that appeared more than once
        duplicated: Vec<String>,
    },

    /// Worker pool could not be created
    #[error("worker pool error: {0}")]
    Pool(String),
}

impl EchoError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        EchoError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a JSON error with the path it happened on
    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        EchoError::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Errors reported by external translation / speech services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The request could not be sent or timed out
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with something unusable
    #[error("unexpected response: {0}")]
    Response(String),

    /// The service has no mapping for this language
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, EchoError>;
