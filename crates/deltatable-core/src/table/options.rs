//! Caller-facing configuration for opening tables and scanning them.

use std::fmt;
use std::sync::Arc;

use arrow::array::{BooleanArray, RecordBatch};
use arrow::error::ArrowError;

pub use crate::transaction_log::VersionPolicy;

/// Rows per batch when the caller does not choose.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// How an explicit version request is applied to a [`crate::table::DeltaTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Replace the handle's snapshot once resolution succeeds.
    InPlace,
    /// Return the resolved snapshot and leave the handle untouched.
    Detached,
}

/// Options applied when a table handle resolves versions and builds scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Behavior for versions newer than the log contains.
    pub version_policy: VersionPolicy,
    /// Batch size of the scan options handed out by the table.
    pub batch_size: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            version_policy: VersionPolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl TableOptions {
    /// Set the policy for versions newer than the log contains.
    pub fn with_version_policy(mut self, policy: VersionPolicy) -> Self {
        self.version_policy = policy;
        self
    }

    /// Set the default scan batch size (at least one).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Row predicate applied to every scanned batch.
///
/// It returns one boolean per row; `false` and null drop the row. The batch
/// it receives is already projected to [`ScanOptions::columns`].
pub type ScanFilter = Arc<dyn Fn(&RecordBatch) -> Result<BooleanArray, ArrowError> + Send + Sync>;

/// What to read during a scan.
#[derive(Clone)]
pub struct ScanOptions {
    /// Columns to read, in output order. `None` reads every column.
    pub columns: Option<Vec<String>>,
    /// Optional row predicate.
    pub filter: Option<ScanFilter>,
    /// Maximum rows per decoded batch.
    pub batch_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            columns: None,
            filter: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl fmt::Debug for ScanOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanOptions")
            .field("columns", &self.columns)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl ScanOptions {
    /// Read only `columns`, in this order.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Keep only rows for which `filter` returns `true`.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RecordBatch) -> Result<BooleanArray, ArrowError> + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Decode at most `batch_size` rows per batch (at least one).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}
