//! Table root locations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::storage::{StorageBackend, StorageLocation, StorageResult, join_root};

/// Table root location with table-scoped semantics.
///
/// This wraps `StorageLocation` and is used when callers need to treat the
/// location as a table root (log layout, data file paths).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLocation(StorageLocation);

impl From<TableLocation> for StorageLocation {
    fn from(t: TableLocation) -> Self {
        t.0
    }
}

impl From<StorageLocation> for TableLocation {
    fn from(s: StorageLocation) -> Self {
        TableLocation(s)
    }
}

impl AsRef<StorageLocation> for TableLocation {
    fn as_ref(&self) -> &StorageLocation {
        &self.0
    }
}

impl fmt::Display for TableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TableLocation {
    /// Creates a new `TableLocation` for a local filesystem path.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        TableLocation(StorageLocation::Local(root.into()))
    }

    /// A table rooted at `root` whose files are read through `backend`.
    pub fn with_backend(root: impl Into<PathBuf>, backend: Arc<dyn StorageBackend>) -> Self {
        TableLocation(StorageLocation::Custom {
            root: root.into(),
            backend,
        })
    }

    /// Parse a user-facing table location string into a TableLocation.
    pub fn parse(spec: &str) -> StorageResult<Self> {
        StorageLocation::parse(spec).map(TableLocation)
    }

    /// Return the underlying StorageLocation.
    pub fn storage(&self) -> &StorageLocation {
        &self.0
    }

    /// Canonical form of a table-relative path: `table_root/rel`.
    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        join_root(&self.0, rel.as_ref())
    }
}
