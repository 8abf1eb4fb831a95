//! Wrapper prelude.
//!
//! The `deltatable` crate is the supported public entry point.
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::layout;
pub use crate::{
    DeltaLogError, DeltaTable, FileSet, ResolveMode, ScanOptions, StorageBackend, TableError,
    TableLocation, TableOptions, TableSnapshot, VersionPolicy,
};
