//! Transaction log reading and snapshot reconstruction.
//!
//! This module reads the `_delta_log/` directory of a table and rebuilds the
//! set of live data files at a given version:
//!
//! - [`actions`] decodes one newline-delimited JSON record into a
//!   [`LogEntry`] (`Add`, `Remove`, or an ignored other kind).
//! - [`checkpoint`] reads the `_last_checkpoint` pointer and loads the file
//!   listing stored in a Parquet checkpoint.
//! - [`replay`] applies the log entries of one checkpoint interval, in
//!   version order, on top of a base [`FileSet`].
//! - [`table_state`] ties the pieces together into an immutable
//!   [`TableSnapshot`].
//!
//! ## Resolution model
//!
//! Checkpoints are written every [`CHECKPOINT_INTERVAL`] versions, so the
//! state at version `v` is the checkpoint at `v - v % 10` plus at most ten
//! log entries that share its name prefix:
//!
//! ```text
//! snapshot(v) = checkpoint(c).files ⊕ entries(c ..= v)    where c = v - v % 10
//! ```
//!
//! `⊕` applies adds and removes in log order. Re-applying the entry at the
//! checkpoint's own version is harmless: its adds are already in the
//! checkpoint and its removes target files that are already gone, which is
//! why removing an untracked path is a silent no-op.
//!
//! Nothing here writes to the log; commit protocols and conflict detection
//! are outside this crate.
//!
//! [`CHECKPOINT_INTERVAL`]: crate::storage::layout::CHECKPOINT_INTERVAL
pub mod actions;
pub mod checkpoint;
pub mod log_store;
pub mod replay;
pub mod table_state;

pub use actions::LogEntry;
pub use checkpoint::LastCheckpoint;
pub use log_store::DeltaLogStore;
pub use replay::ReplayOutcome;
pub use table_state::{FileSet, TableSnapshot, VersionPolicy};

use snafu::{Backtrace, prelude::*};

use crate::storage::StorageError;

/// Errors that can occur while reading the transaction log.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DeltaLogError {
    /// The location has no log entry for version 0.
    #[snafu(display("Not a Delta table: no log entry 0 under {location}"))]
    NotADeltaTable {
        /// Display form of the table root.
        location: String,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// A log line could not be decoded as a log record.
    #[snafu(display("Corrupt log entry at version {version}, line {line}: {msg}"))]
    CorruptLogEntry {
        /// Version of the log file containing the line.
        version: u64,
        /// 1-based line number inside the log file.
        line: usize,
        /// What was wrong with the line.
        msg: String,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// The checkpoint for a non-zero version is missing.
    #[snafu(display("Checkpoint file for version {version} is missing: {source}"))]
    MissingCheckpointFile {
        /// Checkpoint version that was expected to exist.
        version: u64,
        /// Underlying NotFound storage error.
        #[snafu(backtrace)]
        source: StorageError,
    },

    /// The checkpoint exists but does not have the expected shape.
    #[snafu(display("Corrupt checkpoint at version {version}: {msg}"))]
    CorruptCheckpoint {
        /// Checkpoint version.
        version: u64,
        /// What was wrong with the checkpoint.
        msg: String,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// The `_last_checkpoint` pointer exists but could not be parsed.
    #[snafu(display("Corrupt _last_checkpoint pointer: {msg}"))]
    CorruptLastCheckpoint {
        /// What was wrong with the pointer.
        msg: String,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// Log entries inside one checkpoint interval are not contiguous.
    #[snafu(display("Missing log entry: expected version {expected}, found {found}"))]
    MissingLogEntry {
        /// The version that should have come next.
        expected: u64,
        /// The version that was found instead.
        found: u64,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// An explicit version was requested that the log does not contain yet.
    #[snafu(display("Version {requested} is not available; latest available is {latest}"))]
    VersionNotYetAvailable {
        /// The version the caller asked for.
        requested: u64,
        /// The newest version the replay could reach.
        latest: u64,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// Underlying storage error while reading the log or a checkpoint.
    ///
    /// Backtraces are delegated to the inner StorageError.
    #[snafu(display("Storage error while reading transaction log: {source}"))]
    Storage {
        /// Underlying storage error returned by the storage backend.
        #[snafu(backtrace)]
        source: StorageError,
    },
}

#[cfg(test)]
pub(crate) mod test_util;
