//! Table layer.
//!
//! [`DeltaTable`] is the user-facing handle: it opens a table root, keeps the
//! currently resolved [`TableSnapshot`], and scans the snapshot's data files
//! through a [`DatasetView`].
//!
//! Resolution is copy-on-success. A handle's snapshot and view only change
//! after a new snapshot has been fully rebuilt, so a failed `as_version` or
//! `update` leaves the handle exactly as it was.

pub mod error;
pub mod options;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::RecordBatch;
use log::debug;
use snafu::prelude::*;

use crate::storage::{StorageBackend, TableLocation};
use crate::transaction_log::{DeltaLogStore, FileSet, TableSnapshot};

pub use error::TableError;
pub use options::{ResolveMode, ScanFilter, ScanOptions, TableOptions, VersionPolicy};
pub use scan::{DatasetView, DeltaScan};

use error::TransactionLogSnafu;

/// Handle on a Delta table at one resolved version.
#[derive(Debug, Clone)]
pub struct DeltaTable {
    log: DeltaLogStore,
    options: TableOptions,
    current: TableSnapshot,
    dataset: DatasetView,
}

impl DeltaTable {
    /// Open the table at `location` at its newest version.
    pub async fn open(location: TableLocation) -> Result<Self, TableError> {
        Self::open_with_options(location, TableOptions::default()).await
    }

    /// Open the table at `location` at its newest version, with `options`.
    pub async fn open_with_options(
        location: TableLocation,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        Self::open_at(location, None, options).await
    }

    /// Open the table rooted at `root` on a caller-supplied filesystem.
    ///
    /// Every log, checkpoint, and data file read goes through `backend`.
    pub async fn open_with_storage(
        root: impl Into<PathBuf>,
        backend: Arc<dyn StorageBackend>,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        Self::open_with_options(TableLocation::with_backend(root, backend), options).await
    }

    /// Open the table at `location` directly at `version`.
    pub async fn open_at_version(
        location: TableLocation,
        version: u64,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        Self::open_at(location, Some(version), options).await
    }

    async fn open_at(
        location: TableLocation,
        version: Option<u64>,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        let log = DeltaLogStore::new(location);
        log.ensure_delta_table().await.context(TransactionLogSnafu)?;

        let current = log
            .resolve(version, options.version_policy)
            .await
            .context(TransactionLogSnafu)?;
        let dataset = DatasetView::new(log.location().clone(), current.files());

        debug!(
            "opened table {} at version {} ({} files)",
            log.location(),
            current.version(),
            current.files().len()
        );

        Ok(Self {
            log,
            options,
            current,
            dataset,
        })
    }

    async fn resolve(&self, version: Option<u64>) -> Result<TableSnapshot, TableError> {
        self.log
            .resolve(version, self.options.version_policy)
            .await
            .context(TransactionLogSnafu)
    }

    fn publish(&mut self, snapshot: TableSnapshot) {
        self.dataset = DatasetView::new(self.log.location().clone(), snapshot.files());
        self.current = snapshot;
    }

    /// Resolve the table at `version`.
    ///
    /// With [`ResolveMode::InPlace`] the handle switches to the new snapshot;
    /// with [`ResolveMode::Detached`] it is left untouched. Either way the
    /// resolved snapshot is returned.
    pub async fn as_version(
        &mut self,
        version: u64,
        mode: ResolveMode,
    ) -> Result<TableSnapshot, TableError> {
        let snapshot = self.resolve(Some(version)).await?;

        if mode == ResolveMode::InPlace {
            self.publish(snapshot.clone());
        }
        Ok(snapshot)
    }

    /// A new, independent handle on the same table at `version`.
    pub async fn at_version(&self, version: u64) -> Result<DeltaTable, TableError> {
        let current = self.resolve(Some(version)).await?;
        let dataset = DatasetView::new(self.log.location().clone(), current.files());

        Ok(DeltaTable {
            log: self.log.clone(),
            options: self.options,
            current,
            dataset,
        })
    }

    /// Move the handle to the newest version in the log.
    ///
    /// Returns the version the handle is at afterwards.
    pub async fn update(&mut self) -> Result<u64, TableError> {
        let snapshot = self.resolve(None).await?;
        let previous = self.current.version();

        if snapshot != self.current {
            debug!(
                "table {} updated from version {previous} to {}",
                self.log.location(),
                snapshot.version()
            );
            self.publish(snapshot);
        }
        Ok(self.current.version())
    }

    /// Version of the current snapshot.
    pub fn version(&self) -> u64 {
        self.current.version()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &TableSnapshot {
        &self.current
    }

    /// Live files of the current snapshot, relative to the table root.
    pub fn files(&self) -> &FileSet {
        self.current.files()
    }

    /// Live files of the current snapshot as `table_root/path`.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.current
            .files()
            .iter()
            .map(|path| self.log.location().resolve(path))
            .collect()
    }

    /// Root of the table.
    pub fn location(&self) -> &TableLocation {
        self.log.location()
    }

    /// Scan view over the current snapshot.
    pub fn dataset(&self) -> &DatasetView {
        &self.dataset
    }

    /// Options the handle was opened with.
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Scan options preset with the handle's batch size.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::default().with_batch_size(self.options.batch_size)
    }

    /// Stream the current snapshot's rows.
    pub fn scan(&self, options: ScanOptions) -> DeltaScan {
        self.dataset.scan(options)
    }

    /// Read the current snapshot's rows into one batch.
    pub async fn to_table(&self, options: &ScanOptions) -> Result<RecordBatch, TableError> {
        self.dataset.to_table(options).await
    }
}
