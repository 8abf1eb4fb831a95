use std::path::Path;
use std::sync::Arc;

use arrow::array::AsArray;
use arrow::datatypes::{DataType, Field, Int64Type, Schema};
use arrow_array::{ArrayRef, Int64Array, RecordBatch, StringArray};
use parquet::arrow::ArrowWriter;

pub(crate) use crate::transaction_log::test_util::*;

/// Parquet bytes with an `id: Int64` and a `name: Utf8` column.
pub(crate) fn data_file_bytes(
    ids: &[i64],
    names: &[&str],
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ids.to_vec())) as ArrayRef,
            Arc::new(StringArray::from(names.to_vec())) as ArrayRef,
        ],
    )?;

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(buf)
}

/// Write [`data_file_bytes`] to `root/rel_path`.
pub(crate) fn write_data_file(
    root: &Path,
    rel_path: &str,
    ids: &[i64],
    names: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let path = root.join(rel_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data_file_bytes(ids, names)?)?;
    Ok(())
}

/// The `id` column of `batch`, wherever it sits.
pub(crate) fn ids(batch: &RecordBatch) -> Vec<i64> {
    let idx = batch.schema().index_of("id").expect("id column");
    batch
        .column(idx)
        .as_primitive::<Int64Type>()
        .values()
        .to_vec()
}
