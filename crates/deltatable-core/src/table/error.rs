//! Error types and SNAFU context selectors for the `table` layer.
//!
//! `TableError` is what the public [`crate::table::DeltaTable`] API returns.
//! Log and storage failures are wrapped rather than flattened so callers can
//! still match on [`DeltaLogError`] variants (for example
//! `VersionNotYetAvailable`) through the `TransactionLog` variant.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use snafu::prelude::*;

use crate::{storage::StorageError, transaction_log::DeltaLogError};

/// Errors from high-level table operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TableError {
    /// Any error coming from reading the transaction log (not a table,
    /// corrupt entries, missing checkpoints, unavailable versions).
    #[snafu(display("Transaction log error: {source}"))]
    TransactionLog {
        /// Underlying transaction log error.
        #[snafu(source, backtrace)]
        source: DeltaLogError,
    },

    /// Storage error while reading table data files.
    #[snafu(display("Storage error while accessing table data: {source}"))]
    Storage {
        /// Underlying storage error.
        #[snafu(backtrace)]
        source: StorageError,
    },

    /// A data file could not be opened or decoded as Parquet.
    #[snafu(display("Parquet read error in {path}: {source}"))]
    ParquetRead {
        /// Table-relative path of the data file.
        path: String,
        /// Underlying Parquet error.
        source: ParquetError,
    },

    /// Arrow error while decoding, filtering, or concatenating batches.
    #[snafu(display("Arrow error while scanning: {source}"))]
    Arrow {
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// A projected column does not exist in a data file.
    #[snafu(display("Unknown column {column} in {path}"))]
    UnknownColumn {
        /// Requested column name.
        column: String,
        /// Table-relative path of the data file.
        path: String,
    },
}

impl TableError {
    /// The wrapped log error, if this error came from the transaction log.
    pub fn as_log_error(&self) -> Option<&DeltaLogError> {
        match self {
            TableError::TransactionLog { source } => Some(source),
            _ => None,
        }
    }
}
