use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::storage::StorageBackend;

/// In-memory backend keyed by full path. Counts `read` calls.
#[derive(Debug, Default)]
pub(crate) struct MemoryBackend {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    reads: AtomicUsize,
}

impl MemoryBackend {
    pub(crate) fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .expect("memory backend lock")
            .insert(path.into(), contents.into());
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn is_file(&self, path: &Path) -> io::Result<bool> {
        Ok(self
            .files
            .lock()
            .expect("memory backend lock")
            .contains_key(path))
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .expect("memory backend lock")
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let files = self.files.lock().expect("memory backend lock");
        Ok(files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect())
    }
}
