//! Reconstructing table snapshots from checkpoints and log entries.
//!
//! [`TableSnapshot`] is the resolved unit of table state: a version plus the
//! set of data files live at that version. Snapshots are plain immutable
//! values; resolving another version builds a new one and never touches an
//! existing snapshot.
//!
//! Resolution always follows the same three steps:
//! 1. pick a checkpoint (the `_last_checkpoint` pointer for "newest", or the
//!    interval-aligned checkpoint below an explicit version),
//! 2. load its file listing,
//! 3. replay the log entries of that checkpoint's interval on top.
use std::collections::BTreeSet;
use std::collections::btree_set;

use log::warn;

use crate::storage::layout::{self, CHECKPOINT_INTERVAL};
use crate::transaction_log::{DeltaLogError, DeltaLogStore, VersionNotYetAvailableSnafu};

/// Set of table-relative data file paths live at one version.
///
/// Paths are kept exactly as they appear in the log, in sorted order. Use
/// [`crate::storage::TableLocation::resolve`] for the canonical
/// `table_root/path` form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: BTreeSet<String>,
}

impl FileSet {
    /// An empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live files.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no files are live.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether `path` is live.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Mark `path` live. Returns `false` if it already was.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    /// Drop `path`. Returns `false` if it was not live (not an error).
    pub fn remove(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    /// Iterate over the live paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.paths.iter().map(String::as_str)
    }
}

impl From<BTreeSet<String>> for FileSet {
    fn from(paths: BTreeSet<String>) -> Self {
        Self { paths }
    }
}

impl FromIterator<String> for FileSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FileSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// What to do when an explicitly requested version is newer than anything
/// the log contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Fail with [`DeltaLogError::VersionNotYetAvailable`].
    #[default]
    Error,
    /// Return the newest snapshot that could be resolved instead.
    Clamp,
}

/// Resolved table state at one version.
///
/// Invariant:
/// - `files` is the checkpoint at `checkpoint_version` with every log entry
///   of its interval up to and including `version` applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    version: u64,
    checkpoint_version: u64,
    files: FileSet,
}

impl TableSnapshot {
    /// Version this snapshot was resolved at.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Checkpoint the snapshot was rebuilt from (0 when none was used).
    pub fn checkpoint_version(&self) -> u64 {
        self.checkpoint_version
    }

    /// Live data files.
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Consume the snapshot, keeping only its files.
    pub fn into_files(self) -> FileSet {
        self.files
    }
}

impl DeltaLogStore {
    async fn resolve_from_checkpoint(
        &self,
        checkpoint_version: u64,
        target_version: u64,
    ) -> Result<TableSnapshot, DeltaLogError> {
        let base = self.load_checkpoint(checkpoint_version).await?;
        let outcome = self
            .replay_interval(base, checkpoint_version, target_version)
            .await?;

        Ok(TableSnapshot {
            version: outcome.version,
            checkpoint_version,
            files: outcome.files,
        })
    }

    /// Resolve the newest version reachable from the latest checkpoint.
    ///
    /// Without a `_last_checkpoint` pointer replay starts from version 0. The
    /// replay covers at most one checkpoint interval, so the resolved
    /// version is the newest log entry in that interval, or the checkpoint's
    /// own version when no later entries exist.
    pub async fn resolve_latest(&self) -> Result<TableSnapshot, DeltaLogError> {
        let checkpoint_version = self
            .load_last_checkpoint()
            .await?
            .map_or(0, |pointer| pointer.version);

        let target = checkpoint_version.saturating_add(CHECKPOINT_INTERVAL - 1);
        self.resolve_from_checkpoint(checkpoint_version, target)
            .await
    }

    /// Resolve the table at exactly `version`.
    ///
    /// The checkpoint at `version - version % 10` is loaded (none for
    /// versions below 10) and the log is replayed up to `version`. When the
    /// log ends before `version`, `policy` decides between an error and the
    /// newest available snapshot.
    pub async fn resolve_version(
        &self,
        version: u64,
        policy: VersionPolicy,
    ) -> Result<TableSnapshot, DeltaLogError> {
        let checkpoint_version = layout::checkpoint_for_version(version);
        let snapshot = match self.resolve_from_checkpoint(checkpoint_version, version).await {
            Ok(snapshot) => snapshot,
            Err(err @ DeltaLogError::MissingCheckpointFile { .. }) => {
                self.newest_below(version, checkpoint_version, err).await?
            }
            Err(err) => return Err(err),
        };

        if snapshot.version != version {
            match policy {
                VersionPolicy::Error => {
                    return VersionNotYetAvailableSnafu {
                        requested: version,
                        latest: snapshot.version,
                    }
                    .fail();
                }
                VersionPolicy::Clamp => {
                    warn!(
                        "version {version} is not available; using version {} instead",
                        snapshot.version
                    );
                }
            }
        }

        Ok(snapshot)
    }

    /// Fallback for a request whose interval checkpoint is missing.
    ///
    /// When the interval has no log entries either, the request lies past
    /// the end of the log and the newest snapshot is returned for the
    /// caller's policy check. Otherwise, or when the newest version is not
    /// below `version` (the checkpoint was cleaned up), `missing` is
    /// returned unchanged.
    async fn newest_below(
        &self,
        version: u64,
        checkpoint_version: u64,
        missing: DeltaLogError,
    ) -> Result<TableSnapshot, DeltaLogError> {
        if !self
            .list_interval_versions(checkpoint_version)
            .await?
            .is_empty()
        {
            return Err(missing);
        }

        let latest = self.resolve_latest().await?;
        if latest.version >= version {
            return Err(missing);
        }
        Ok(latest)
    }

    /// Resolve `target`, or the newest version when `target` is `None`.
    pub async fn resolve(
        &self,
        target: Option<u64>,
        policy: VersionPolicy,
    ) -> Result<TableSnapshot, DeltaLogError> {
        match target {
            Some(version) => self.resolve_version(version, policy).await,
            None => self.resolve_latest().await,
        }
    }
}
