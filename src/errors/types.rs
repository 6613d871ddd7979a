//! Error type definitions for HomeDash

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
///
/// Returned by request handlers; `web::responses::handle_error` turns each
/// variant into an HTTP status code and a JSON error envelope.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed request payload
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Well-formed payload that fails validation
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Operation already in progress errors
    #[error("Operation already in progress: {operation}")]
    Conflict { operation: String },

    /// File system errors while serving content
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Icon catalog ingestion errors, one family per pipeline stage
#[derive(Error, Debug)]
pub enum IconError {
    /// Transport-level failure while downloading the archive
    #[error("Failed to download icon archive from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Download did not finish within the configured timeout
    #[error("Timed out downloading icon archive from {url}")]
    Timeout { url: String },

    /// Remote answered with a non-success status
    #[error("Icon archive request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// File system failure in any stage
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive is corrupt or unreadable
    #[error("Invalid icon archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Extracted archive does not contain the expected icons directory and manifest
    #[error("Icon bundle not found under {0}")]
    BundleNotFound(PathBuf),

    /// Manifest could not be parsed or serialized
    #[error("Invalid icon manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Another refresh already holds the catalog
    #[error("Icon catalog refresh already in progress")]
    RefreshInProgress,

    /// A blocking stage panicked or was cancelled
    #[error("Icon catalog task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a bad request error
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an operation in progress error
    pub fn conflict<S: Into<String>>(operation: S) -> Self {
        Self::Conflict {
            operation: operation.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl IconError {
    /// Attach the offending path to an I/O error
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn manifest<P: Into<PathBuf>>(path: P, source: serde_json::Error) -> Self {
        Self::Manifest {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure happened before anything reached the cache
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout { .. } | Self::Status { .. }
        )
    }
}
