//! # deltatable
//!
//! Read Delta-style tables at any version.
//!
//! This crate is the supported public entry point and provides a small, stable surface
//! over `deltatable-core`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use deltatable::prelude::*;
//!
//! let mut table = DeltaTable::open(TableLocation::parse("/data/events")?).await?;
//! let at_three = table.as_version(3, ResolveMode::Detached).await?;
//! let batch = table.to_table(&table.scan_options().with_columns(["id"])).await?;
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// Log layout namespace (wrapper-only).
pub mod layout {
    pub use deltatable_core::storage::layout::{
        CHECKPOINT_INTERVAL, LOG_DIR_NAME, VersionNameError, checkpoint_file_name,
        checkpoint_for_version, commit_file_name, name_to_version, version_to_name,
    };
}

pub use deltatable_core::storage::{LocalFileSystem, StorageBackend, StorageError, TableLocation};
pub use deltatable_core::table::{
    DatasetView, DeltaScan, DeltaTable, ResolveMode, ScanFilter, ScanOptions, TableError,
    TableOptions,
};
pub use deltatable_core::transaction_log::{
    DeltaLogError, FileSet, TableSnapshot, VersionPolicy,
};
