//! Checkpoint pointer and checkpoint loading.
//!
//! A checkpoint is a Parquet file holding the live file set as of one
//! version. Each row carries a nullable `add` struct; rows for other action
//! kinds (`metaData`, `protocol`, `remove`, ...) leave it null. Only rows with
//! a non-null `add.path` contribute files. `remove` rows are not interpreted:
//! a checkpoint only lists live files.
//!
//! `_last_checkpoint` names the newest checkpoint. Its absence is not an
//! error, it just means the table has never been checkpointed and replay
//! starts from version 0.
use std::collections::BTreeSet;

use arrow::array::{Array, AsArray};
use arrow::datatypes::DataType;
use bytes::Bytes;
use log::debug;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use snafu::prelude::*;

use crate::storage::{self, layout};
use crate::transaction_log::{
    CorruptCheckpointSnafu, CorruptLastCheckpointSnafu, DeltaLogError, DeltaLogStore, FileSet,
    MissingCheckpointFileSnafu,
};

/// Contents of `_delta_log/_last_checkpoint`.
///
/// Writers record more fields than these; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastCheckpoint {
    /// Version the checkpoint was taken at.
    pub version: u64,
    /// Number of actions stored in the checkpoint, if recorded.
    #[serde(default)]
    pub size: Option<u64>,
    /// Number of parts for multi-part checkpoints, if recorded.
    #[serde(default)]
    pub parts: Option<u64>,
}

const ADD_COLUMN: &str = "add";
const PATH_FIELD: &str = "path";

fn corrupt(version: u64, msg: impl Into<String>) -> DeltaLogError {
    CorruptCheckpointSnafu {
        version,
        msg: msg.into(),
    }
    .build()
}

/// Collect the live file paths from in-memory checkpoint bytes.
pub(crate) fn files_from_checkpoint_bytes(
    version: u64,
    bytes: Bytes,
) -> Result<FileSet, DeltaLogError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .map_err(|e| corrupt(version, format!("unreadable parquet: {e}")))?;

    let add_idx = builder
        .schema()
        .index_of(ADD_COLUMN)
        .map_err(|_| corrupt(version, "missing `add` column"))?;

    let add_type = builder.schema().field(add_idx).data_type().clone();
    ensure!(
        matches!(add_type, DataType::Struct(_)),
        CorruptCheckpointSnafu {
            version,
            msg: format!("`add` column has type {add_type}, expected a struct"),
        }
    );

    // Only decode the `add` column; the other action columns can be large.
    let mask = ProjectionMask::roots(builder.parquet_schema(), [add_idx]);
    let reader = builder
        .with_projection(mask)
        .build()
        .map_err(|e| corrupt(version, format!("unreadable parquet: {e}")))?;

    let mut paths = BTreeSet::new();

    for batch in reader {
        let batch = batch.map_err(|e| corrupt(version, format!("unreadable batch: {e}")))?;

        let add = batch
            .column(0)
            .as_struct_opt()
            .ok_or_else(|| corrupt(version, "`add` column is not a struct"))?;
        let path_col = add
            .column_by_name(PATH_FIELD)
            .ok_or_else(|| corrupt(version, "`add` struct has no `path` field"))?;

        // Both offsets widths show up depending on the writer.
        if let Some(path_arr) = path_col.as_string_opt::<i32>() {
            for i in 0..add.len() {
                if add.is_valid(i) && path_arr.is_valid(i) {
                    paths.insert(path_arr.value(i).to_string());
                }
            }
        } else if let Some(path_arr) = path_col.as_string_opt::<i64>() {
            for i in 0..add.len() {
                if add.is_valid(i) && path_arr.is_valid(i) {
                    paths.insert(path_arr.value(i).to_string());
                }
            }
        } else {
            return CorruptCheckpointSnafu {
                version,
                msg: format!("`add.path` has type {}, expected a string", path_col.data_type()),
            }
            .fail();
        }
    }

    Ok(FileSet::from(paths))
}

impl DeltaLogStore {
    /// Load the `_last_checkpoint` pointer.
    ///
    /// Behavior:
    /// - If the pointer does not exist, return `None` (never checkpointed).
    /// - If it exists but is not valid JSON with a `version`, return
    ///   `CorruptLastCheckpoint`.
    pub async fn load_last_checkpoint(&self) -> Result<Option<LastCheckpoint>, DeltaLogError> {
        let rel = layout::last_checkpoint_rel_path();

        let contents = match storage::read_to_string(self.location().as_ref(), &rel).await {
            Ok(s) => s,
            Err(e) if e.is_not_found() => {
                debug!(
                    "no checkpoint pointer at {}; replaying from version 0",
                    e.path().unwrap_or_default()
                );
                return Ok(None);
            }
            Err(source) => return Err(DeltaLogError::Storage { source }),
        };

        let pointer: LastCheckpoint = serde_json::from_str(&contents).map_err(|e| {
            CorruptLastCheckpointSnafu {
                msg: format!("failed to parse {contents:?}: {e}"),
            }
            .build()
        })?;

        Ok(Some(pointer))
    }

    /// Load the live file set recorded by the checkpoint at `version`.
    ///
    /// Version 0 means "no checkpoint": an empty set is returned without any
    /// I/O. For any other version the checkpoint file must exist.
    pub async fn load_checkpoint(&self, version: u64) -> Result<FileSet, DeltaLogError> {
        if version == 0 {
            return Ok(FileSet::new());
        }

        let rel = layout::checkpoint_rel_path(version);
        let bytes = match storage::read_all_bytes(self.location().as_ref(), &rel).await {
            Ok(bytes) => bytes,
            Err(source) if source.is_not_found() => {
                return Err(source).context(MissingCheckpointFileSnafu { version });
            }
            Err(source) => return Err(DeltaLogError::Storage { source }),
        };

        let files = files_from_checkpoint_bytes(version, Bytes::from(bytes))?;
        debug!("loaded checkpoint {version} with {} live files", files.len());

        Ok(files)
    }
}
