//! Async helpers for reading the transaction log.
//!
//! This module owns all on-disk interactions with `_delta_log/` that are not
//! specific to checkpoints:
//! - Detecting whether a location holds a table at all (log entry 0).
//! - Enumerating the log entry files of one checkpoint interval, in version
//!   order.
//! - Reading and decoding the log entries of a single version.
//!
//! Storage-layer failures are mapped into [`DeltaLogError`] variants so
//! callers can tell corrupt logs apart from I/O problems.
use log::debug;
use snafu::prelude::*;

use crate::storage::{self, TableLocation, layout};
use crate::transaction_log::actions::{LogEntry, decode_log};
use crate::transaction_log::{DeltaLogError, NotADeltaTableSnafu, StorageSnafu};

/// Helper for reading the transaction log under a table root.
///
/// Layout:
///
/// ```text
/// <root>/_delta_log/00000000000000000000.json
/// <root>/_delta_log/00000000000000000010.checkpoint.parquet
/// <root>/_delta_log/_last_checkpoint
/// ```
#[derive(Debug, Clone)]
pub struct DeltaLogStore {
    location: TableLocation,
}

impl DeltaLogStore {
    /// Create a new DeltaLogStore rooted at a table directory.
    pub fn new(location: TableLocation) -> Self {
        Self { location }
    }

    /// Get the TableLocation of the log store.
    pub fn location(&self) -> &TableLocation {
        &self.location
    }

    /// Return whether log entry 0 exists.
    pub async fn is_delta_table(&self) -> Result<bool, DeltaLogError> {
        storage::exists(self.location.as_ref(), &layout::commit_rel_path(0))
            .await
            .context(StorageSnafu)
    }

    /// Fail with [`DeltaLogError::NotADeltaTable`] unless log entry 0 exists.
    pub async fn ensure_delta_table(&self) -> Result<(), DeltaLogError> {
        if self.is_delta_table().await? {
            return Ok(());
        }

        NotADeltaTableSnafu {
            location: self.location.to_string(),
        }
        .fail()
    }

    /// List the versions of all log entries that belong to the checkpoint
    /// interval starting at `checkpoint_version`, in ascending order.
    ///
    /// Files that share the interval's name prefix but are not log entries
    /// (the checkpoint itself, CRC files, temp files) are skipped.
    pub async fn list_interval_versions(
        &self,
        checkpoint_version: u64,
    ) -> Result<Vec<u64>, DeltaLogError> {
        let prefix = layout::decade_prefix(checkpoint_version);

        let names = storage::list_prefix(self.location.as_ref(), &layout::log_rel_dir(), &prefix)
            .await
            .context(StorageSnafu)?;

        // Fixed-width names: lexical order of `names` is already version order.
        let versions: Vec<u64> = names
            .iter()
            .filter_map(|name| layout::parse_commit_file_name(name))
            .collect();

        debug!(
            "found {} log entries with prefix {prefix} under {}",
            versions.len(),
            self.location.resolve(layout::LOG_DIR_NAME).display()
        );

        Ok(versions)
    }

    /// Read and decode the log entries committed at `version`.
    ///
    /// - On storage-layer failures, returns `DeltaLogError::Storage`.
    /// - On an undecodable line, returns `DeltaLogError::CorruptLogEntry`.
    pub async fn load_log_entries(&self, version: u64) -> Result<Vec<LogEntry>, DeltaLogError> {
        let rel = layout::commit_rel_path(version);
        let contents = storage::read_to_string(self.location.as_ref(), &rel)
            .await
            .context(StorageSnafu)?;

        decode_log(&contents, version)
    }
}
