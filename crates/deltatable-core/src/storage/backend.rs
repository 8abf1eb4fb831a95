//! Pluggable filesystem backends.
//!
//! The engine needs three primitives from whatever holds a table's files:
//! check a path, read a whole file, and list the regular files of a
//! directory. [`LocalFileSystem`] implements them with `tokio::fs` and is
//! what plain paths use; callers with their own storage implement
//! [`StorageBackend`] and attach it with
//! [`TableLocation::with_backend`](crate::storage::TableLocation::with_backend).
//!
//! Backends deal in raw `io::Error`s. The free functions in
//! [`crate::storage`] turn `ErrorKind::NotFound` into
//! [`StorageError::NotFound`](crate::storage::StorageError::NotFound) and
//! everything else into `OtherIo`, so a backend only has to report missing
//! files with the right kind.
use std::fmt;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

/// Read-only access to the files of a table.
///
/// Paths are the table root joined with a table-relative path.
#[async_trait]
pub trait StorageBackend: fmt::Debug + Send + Sync {
    /// Whether `path` is a regular file. A missing path is `Ok(false)` or an
    /// `ErrorKind::NotFound` error; both mean "absent".
    async fn is_file(&self, path: &Path) -> io::Result<bool>;

    /// Full contents of the file at `path`.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Names of the regular files directly inside `dir`, in any order.
    ///
    /// A missing directory may be reported as an empty list or as
    /// `ErrorKind::NotFound`.
    async fn list_files(&self, dir: &Path) -> io::Result<Vec<String>>;
}

/// The local filesystem, through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalFileSystem;

#[async_trait]
impl StorageBackend for LocalFileSystem {
    async fn is_file(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path).await?.is_file())
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            // Non UTF-8 names can never match a version-named log file.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if entry.file_type().await?.is_file() {
                names.push(name);
            }
        }

        Ok(names)
    }
}
