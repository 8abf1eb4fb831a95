//! Storage error types and SNAFU context selectors.

use std::{error::Error, fmt, io};

use snafu::{Backtrace, prelude::*};

/// Raw failure reported by a storage backend, before the storage layer adds
/// the path it was reading.
#[derive(Debug)]
pub enum BackendError {
    /// Error from `tokio::fs` on the local filesystem.
    Local(io::Error),
    /// Error from a caller-supplied [`StorageBackend`](crate::storage::StorageBackend).
    Custom(io::Error),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Local(e) => write!(f, "local I/O error: {e}"),
            BackendError::Custom(e) => write!(f, "storage backend error: {e}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BackendError::Local(e) | BackendError::Custom(e) => Some(e),
        }
    }
}

/// Errors from reading table files.
///
/// The storage layer never writes, so every variant describes a failed
/// existence check, read, or listing.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// The file to read does not exist.
    #[snafu(display("Path not found: {path}"))]
    NotFound {
        /// Absolute path that was read.
        path: String,
        /// Backend error reporting the missing file.
        source: BackendError,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// Any other I/O failure (permissions, invalid UTF-8, a directory where
    /// a file was expected, ...).
    #[snafu(display("I/O error at {path}: {source}"))]
    OtherIo {
        /// Absolute path being accessed.
        path: String,
        /// Backend error with platform-specific details.
        source: BackendError,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// The location string names a backend this crate cannot read.
    #[snafu(display("Unsupported table location {spec:?}: scheme {scheme:?} is not supported"))]
    UnsupportedLocation {
        /// The location string supplied by the caller.
        spec: String,
        /// The URI scheme that was rejected.
        scheme: String,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },
}

impl StorageError {
    /// Whether the read failed only because the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    /// Path the failed operation touched, if it got as far as a path.
    pub fn path(&self) -> Option<&str> {
        match self {
            StorageError::NotFound { path, .. } | StorageError::OtherIo { path, .. } => Some(path),
            StorageError::UnsupportedLocation { .. } => None,
        }
    }
}
