//! Incremental replay of log entries on top of a base file set.
//!
//! Replay only ever looks at one checkpoint interval: the log entries whose
//! version names share the checkpoint's prefix (see
//! [`layout::decade_prefix`]). They are applied in version order until the
//! target version has been applied or the interval runs out of entries.
use log::debug;
use snafu::prelude::*;

use crate::storage::layout;
use crate::transaction_log::{
    DeltaLogError, DeltaLogStore, FileSet, LogEntry, MissingLogEntrySnafu,
};

/// Result of replaying one checkpoint interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Live files after the last applied log entry.
    pub files: FileSet,
    /// Version of the last applied log entry, or the checkpoint version when
    /// nothing was applied.
    pub version: u64,
}

/// Apply one decoded entry to `files`.
pub(crate) fn apply_entry(files: &mut FileSet, entry: LogEntry, version: u64) {
    match entry {
        LogEntry::Add { path } => {
            files.insert(path);
        }
        LogEntry::Remove { path } => {
            if !files.remove(&path) {
                // Expected when the checkpoint's own log entry is replayed.
                debug!("version {version}: remove of untracked file {path} ignored");
            }
        }
        LogEntry::Other => {}
    }
}

impl DeltaLogStore {
    /// Replay the log entries of the interval starting at
    /// `checkpoint_version` on top of `files`, up to `target_version`.
    ///
    /// - Entries are applied in ascending version order; adds insert and
    ///   removes delete (removing an absent path is a no-op).
    /// - Replay stops right after `target_version` is applied. Entries above
    ///   the target are never read.
    /// - If the interval has no entry for `target_version`, replay stops at
    ///   the last entry found; [`ReplayOutcome::version`] tells the caller
    ///   how far it got.
    /// - Entries must be contiguous. The first one may be the checkpoint's
    ///   own version or the one right after it (for version 0 it must be 0).
    pub async fn replay_interval(
        &self,
        files: FileSet,
        checkpoint_version: u64,
        target_version: u64,
    ) -> Result<ReplayOutcome, DeltaLogError> {
        let versions = self.list_interval_versions(checkpoint_version).await?;

        let mut files = files;
        let mut resolved = checkpoint_version;
        let mut applied = 0usize;
        let mut next_expected = if checkpoint_version == 0 {
            0
        } else {
            checkpoint_version.saturating_add(1)
        };

        for version in versions {
            // Only reachable with a checkpoint that is not interval-aligned.
            if version < checkpoint_version {
                continue;
            }
            if version > target_version {
                break;
            }

            let in_order = if applied == 0 {
                version <= next_expected
            } else {
                version == next_expected
            };
            ensure!(
                in_order,
                MissingLogEntrySnafu {
                    expected: next_expected,
                    found: version,
                }
            );

            for entry in self.load_log_entries(version).await? {
                apply_entry(&mut files, entry, version);
            }
            resolved = version;
            applied += 1;

            if version == target_version {
                break;
            }
            next_expected = version + 1;
        }

        debug!(
            "replayed {applied} log entries from checkpoint {checkpoint_version} \
             (prefix {}), resolved version {resolved}, {} live files",
            layout::decade_prefix(checkpoint_version),
            files.len()
        );

        Ok(ReplayOutcome {
            files,
            version: resolved,
        })
    }
}
