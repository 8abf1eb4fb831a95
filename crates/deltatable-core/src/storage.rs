//! Storage backend and path utilities.
//!
//! This module is the filesystem collaborator of the snapshot engine. It maps
//! a table root to the files the reader needs and offers the small set of
//! read-only operations the log replay depends on:
//!
//! - `exists`: check for a file (used for the "is this a Delta table" check).
//! - `read_to_string`: read a whole text file (log entries, checkpoint pointer).
//! - `read_all_bytes`: read a whole binary file (checkpoints, data files).
//! - `list_prefix`: list file names in a directory that share a name prefix
//!   (used to enumerate the log files of one checkpoint interval).
//!
//! Plain paths are served by [`LocalFileSystem`]. Any other filesystem plugs
//! in as a [`StorageBackend`] through [`StorageLocation::Custom`]; the log and
//! table layers only ever see [`StorageLocation`] / [`TableLocation`] and
//! relative paths.
//!
//! All operations are async and never overlap: the engine awaits each one
//! before issuing the next.

pub mod backend;
pub mod error;
pub mod layout;
pub mod table_location;

#[cfg(test)]
pub(crate) mod test_util;

pub use backend::{LocalFileSystem, StorageBackend};
pub use error::{BackendError, StorageError};
pub use table_location::TableLocation;

pub(crate) use error::{NotFoundSnafu, OtherIoSnafu, UnsupportedLocationSnafu};

use snafu::{IntoError, prelude::*};
use std::{
    fmt, io,
    path::{Path, PathBuf},
    sync::Arc,
};

/// General result type used by storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

static LOCAL: LocalFileSystem = LocalFileSystem;

/// Where a table's files physically live.
#[derive(Clone, Debug)]
pub enum StorageLocation {
    /// A directory on the local filesystem.
    Local(PathBuf),
    /// A root served by a caller-supplied backend.
    Custom {
        /// Root the table-relative paths are joined onto.
        root: PathBuf,
        /// Backend that performs the reads.
        backend: Arc<dyn StorageBackend>,
    },
}

impl PartialEq for StorageLocation {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StorageLocation::Local(a), StorageLocation::Local(b)) => a == b,
            (
                StorageLocation::Custom { root: a, backend: x },
                StorageLocation::Custom { root: b, backend: y },
            ) => a == b && Arc::ptr_eq(x, y),
            _ => false,
        }
    }
}

impl Eq for StorageLocation {}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root().display())
    }
}

impl StorageLocation {
    /// Parse a user-facing location string.
    ///
    /// Accepts a plain filesystem path or a `file://` URI. Any other scheme
    /// (for example `s3://`) is rejected with
    /// [`StorageError::UnsupportedLocation`]; such stores are reached through
    /// [`StorageLocation::Custom`] instead.
    pub fn parse(spec: &str) -> StorageResult<Self> {
        if let Some(path) = spec.strip_prefix("file://") {
            return Ok(StorageLocation::Local(PathBuf::from(path)));
        }

        if let Some((scheme, _)) = spec.split_once("://") {
            return UnsupportedLocationSnafu {
                spec: spec.to_string(),
                scheme: scheme.to_string(),
            }
            .fail();
        }

        Ok(StorageLocation::Local(PathBuf::from(spec)))
    }

    /// Root directory of the location.
    pub fn root(&self) -> &Path {
        match self {
            StorageLocation::Local(root) | StorageLocation::Custom { root, .. } => root,
        }
    }

    fn backend(&self) -> &dyn StorageBackend {
        match self {
            StorageLocation::Local(_) => &LOCAL,
            StorageLocation::Custom { backend, .. } => backend.as_ref(),
        }
    }

    fn backend_error(&self, err: io::Error) -> BackendError {
        match self {
            StorageLocation::Local(_) => BackendError::Local(err),
            StorageLocation::Custom { .. } => BackendError::Custom(err),
        }
    }
}

/// Join a location's root with a relative path.
pub(crate) fn join_root(location: &StorageLocation, rel: &Path) -> PathBuf {
    location.root().join(rel)
}

fn read_error(location: &StorageLocation, path: String, err: io::Error) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        NotFoundSnafu { path }.into_error(location.backend_error(err))
    } else {
        OtherIoSnafu { path }.into_error(location.backend_error(err))
    }
}

/// Return whether a regular file exists at `rel_path`.
///
/// A missing file (or a missing parent directory) is `Ok(false)`; any other
/// I/O problem is surfaced as [`StorageError::OtherIo`].
pub async fn exists(location: &StorageLocation, rel_path: &Path) -> StorageResult<bool> {
    let abs = join_root(location, rel_path);

    match location.backend().is_file(&abs).await {
        Ok(is_file) => Ok(is_file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(location.backend_error(e)).context(OtherIoSnafu {
            path: abs.display().to_string(),
        }),
    }
}

/// Read the file at `rel_path` and return its contents as a `String`.
///
/// A missing file is reported as [`StorageError::NotFound`]; other filesystem
/// problems (including invalid UTF-8) produce [`StorageError::OtherIo`].
pub async fn read_to_string(location: &StorageLocation, rel_path: &Path) -> StorageResult<String> {
    let bytes = read_all_bytes(location, rel_path).await?;

    String::from_utf8(bytes).map_err(|e| {
        read_error(
            location,
            join_root(location, rel_path).display().to_string(),
            io::Error::new(io::ErrorKind::InvalidData, e),
        )
    })
}

/// Read the full contents of the file at `rel_path`.
///
/// Errors:
/// - If the file does not exist this returns [`StorageError::NotFound`].
/// - On any other I/O error this returns [`StorageError::OtherIo`].
pub async fn read_all_bytes(location: &StorageLocation, rel_path: &Path) -> StorageResult<Vec<u8>> {
    let abs = join_root(location, rel_path);

    location
        .backend()
        .read(&abs)
        .await
        .map_err(|e| read_error(location, abs.display().to_string(), e))
}

/// List the names of regular files directly inside `rel_dir` whose name
/// starts with `name_prefix`.
///
/// Names are returned sorted lexicographically. A missing directory is
/// treated as empty, matching the behavior of a glob that matches nothing.
pub async fn list_prefix(
    location: &StorageLocation,
    rel_dir: &Path,
    name_prefix: &str,
) -> StorageResult<Vec<String>> {
    let abs = join_root(location, rel_dir);

    let mut names = match location.backend().list_files(&abs).await {
        Ok(names) => names,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(location.backend_error(e)).context(OtherIoSnafu {
                path: abs.display().to_string(),
            });
        }
    };

    names.retain(|name| name.starts_with(name_prefix));
    names.sort_unstable();
    Ok(names)
}
