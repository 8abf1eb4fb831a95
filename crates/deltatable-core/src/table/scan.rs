//! Scanning the data files of a resolved snapshot.
//!
//! [`DatasetView`] is the scan-side view of one snapshot: the table location
//! plus the live file list, in file-set order. A table handle rebuilds its
//! view every time it resolves a version, so scans always see exactly the
//! files of the current snapshot.
//!
//! Each file is read whole through the storage layer and decoded with
//! Parquet's Arrow reader:
//! - the projection keeps only the requested root columns and then reorders
//!   them to the requested order,
//! - batches are capped at [`ScanOptions::batch_size`] rows,
//! - the optional filter is evaluated per batch and applied with
//!   `filter_record_batch` (null mask entries drop the row).
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use arrow::array::{RecordBatch, RecordBatchReader};
use arrow::compute::{concat_batches, filter_record_batch};
use arrow::datatypes::{Schema, SchemaRef};
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use snafu::prelude::*;

use crate::storage::{self, TableLocation};
use crate::table::error::{
    ArrowSnafu, ParquetReadSnafu, StorageSnafu, TableError, UnknownColumnSnafu,
};
use crate::table::options::ScanOptions;
use crate::transaction_log::FileSet;

/// Stream of record batches produced by a scan.
pub type DeltaScan = Pin<Box<dyn Stream<Item = Result<RecordBatch, TableError>> + Send>>;

/// The file list of one snapshot, ready to be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetView {
    location: TableLocation,
    files: Arc<[String]>,
}

impl DatasetView {
    /// Build a view over `files` under `location`.
    pub fn new(location: TableLocation, files: &FileSet) -> Self {
        Self {
            location,
            files: files.iter().map(str::to_string).collect(),
        }
    }

    /// Table-relative paths of the files this view reads.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Stream the matching batches of every file, file by file.
    pub fn scan(&self, options: ScanOptions) -> DeltaScan {
        let location = self.location.clone();
        let files: Vec<String> = self.files.to_vec();

        let stream = futures::stream::iter(files)
            .then(move |path| {
                let location = location.clone();
                let options = options.clone();

                async move {
                    let (_, batches) = read_data_file(&location, &path, &options).await?;
                    Ok::<_, TableError>(futures::stream::iter(
                        batches.into_iter().map(Ok::<_, TableError>),
                    ))
                }
            })
            .try_flatten();

        Box::pin(stream)
    }

    /// Read every matching row into a single batch.
    ///
    /// The output schema is the (projected) schema of the first file. A view
    /// with no files yields an empty batch with an empty schema.
    pub async fn to_table(&self, options: &ScanOptions) -> Result<RecordBatch, TableError> {
        let mut schema: Option<SchemaRef> = None;
        let mut batches = Vec::new();

        for path in self.files.iter() {
            let (file_schema, file_batches) =
                read_data_file(&self.location, path, options).await?;
            schema.get_or_insert(file_schema);
            batches.extend(file_batches);
        }

        match schema {
            Some(schema) => concat_batches(&schema, &batches).context(ArrowSnafu),
            None => Ok(RecordBatch::new_empty(Arc::new(Schema::empty()))),
        }
    }
}

/// Positions that put root-ordered projected columns back in request order.
fn request_order(indices: &[usize]) -> Vec<usize> {
    let mut roots = indices.to_vec();
    roots.sort_unstable();
    roots.dedup();

    indices
        .iter()
        .map(|idx| roots.binary_search(idx).unwrap_or_else(|pos| pos))
        .collect()
}

async fn read_data_file(
    location: &TableLocation,
    path: &str,
    options: &ScanOptions,
) -> Result<(SchemaRef, Vec<RecordBatch>), TableError> {
    // 1) Use storage layer to get raw bytes.
    let bytes = storage::read_all_bytes(location.as_ref(), Path::new(path))
        .await
        .context(StorageSnafu)?;

    // 2) Build a reader over the in-memory buffer, projected if requested.
    let mut builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
        .context(ParquetReadSnafu { path })?;

    let mut reorder = None;
    if let Some(columns) = &options.columns {
        let file_schema = builder.schema().clone();
        let indices = columns
            .iter()
            .map(|column| {
                file_schema.index_of(column).ok().context(UnknownColumnSnafu {
                    column: column.as_str(),
                    path,
                })
            })
            .collect::<Result<Vec<usize>, TableError>>()?;

        let mask = ProjectionMask::roots(builder.parquet_schema(), indices.iter().copied());
        builder = builder.with_projection(mask);
        reorder = Some(request_order(&indices));
    }

    let reader = builder
        .with_batch_size(options.batch_size)
        .build()
        .context(ParquetReadSnafu { path })?;

    let mut schema = reader.schema();
    if let Some(order) = &reorder {
        schema = Arc::new(schema.project(order).context(ArrowSnafu)?);
    }

    // 3) Decode, reorder, filter.
    let mut out = Vec::new();
    for batch in reader {
        let mut batch = batch.context(ArrowSnafu)?;

        if let Some(order) = &reorder {
            batch = batch.project(order).context(ArrowSnafu)?;
        }

        if let Some(filter) = &options.filter {
            let mask = filter(&batch).context(ArrowSnafu)?;
            batch = filter_record_batch(&batch, &mask).context(ArrowSnafu)?;
        }

        if batch.num_rows() > 0 {
            out.push(batch);
        }
    }

    Ok((schema, out))
}
