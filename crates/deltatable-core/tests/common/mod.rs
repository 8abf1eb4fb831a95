//! Fixture writers shared by the integration tests.
#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema};
use arrow_array::{ArrayRef, Int64Array, RecordBatch, StringArray, StructArray};
use deltatable_core::storage::layout;
use parquet::arrow::ArrowWriter;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn add(path: &str) -> String {
    format!(r#"{{"add":{{"path":"{path}","size":100,"partitionValues":{{}},"dataChange":true}}}}"#)
}

pub fn remove(path: &str) -> String {
    format!(r#"{{"remove":{{"path":"{path}","dataChange":true}}}}"#)
}

pub fn metadata() -> String {
    r#"{"metaData":{"id":"t","format":{"provider":"parquet"},"schemaString":"{}","partitionColumns":[]}}"#
        .to_string()
}

fn write_in_log(root: &Path, name: &str, contents: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dir = root.join(layout::LOG_DIR_NAME);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(name), contents)?;
    Ok(())
}

/// `_delta_log/<version>.json`, one record per line.
pub fn commit(root: &Path, version: u64, lines: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    write_in_log(root, &layout::commit_file_name(version), &(lines.join("\n") + "\n"))
}

pub fn last_checkpoint(root: &Path, version: u64) -> Result<(), Box<dyn std::error::Error>> {
    write_in_log(
        root,
        layout::LAST_CHECKPOINT_FILE_NAME,
        &format!(r#"{{"version":{version}}}"#),
    )
}

/// A checkpoint whose rows are the `add`s for `paths` plus one non-add row.
pub fn checkpoint(root: &Path, version: u64, paths: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
    let add_fields = Fields::from(vec![Field::new("path", DataType::Utf8, true)]);

    let mut values: Vec<Option<&str>> = paths.iter().copied().map(Some).collect();
    values.push(None);
    let mut validity = vec![true; paths.len()];
    validity.push(false);

    let add = StructArray::new(
        add_fields.clone(),
        vec![Arc::new(StringArray::from(values)) as ArrayRef],
        Some(NullBuffer::from(validity)),
    );
    let schema = Arc::new(Schema::new(vec![Field::new(
        "add",
        DataType::Struct(add_fields),
        true,
    )]));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(add) as ArrayRef])?;

    let dir = root.join(layout::LOG_DIR_NAME);
    std::fs::create_dir_all(&dir)?;
    let mut writer = ArrowWriter::try_new(
        File::create(dir.join(layout::checkpoint_file_name(version)))?,
        schema,
        None,
    )?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// A data file with `id: Int64` and `symbol: Utf8` columns.
pub fn data_file(
    root: &Path,
    rel_path: &str,
    ids: &[i64],
    symbols: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("symbol", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ids.to_vec())) as ArrayRef,
            Arc::new(StringArray::from(symbols.to_vec())) as ArrayRef,
        ],
    )?;

    let path = root.join(rel_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
