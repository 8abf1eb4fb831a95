//! Core engine for reading Delta-style tables.
//!
//! A table is a directory of Parquet data files plus a `_delta_log/`
//! directory describing which of those files are live at each version. This
//! crate rebuilds that file list for any version and scans it:
//!
//! - Storage backend abstraction and the `_delta_log/` naming scheme
//!   (`storage` module).
//! - Log record decoding, checkpoint loading, incremental replay, and
//!   snapshot resolution (`transaction_log` module).
//! - A `DeltaTable` handle that keeps the resolved snapshot and scans its
//!   files with Arrow (`table` module).
//!
//! The crate only reads; it never writes log entries or checkpoints.
#![deny(missing_docs)]
pub mod storage;
pub mod table;
pub mod transaction_log;

pub use storage::TableLocation;
pub use table::{DeltaTable, ResolveMode, ScanOptions, TableError, TableOptions};
pub use transaction_log::{DeltaLogError, FileSet, TableSnapshot, VersionPolicy};
