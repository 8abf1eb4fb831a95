use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema};
use arrow_array::{ArrayRef, RecordBatch, StringArray, StructArray};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use crate::storage::{TableLocation, layout};
use crate::transaction_log::DeltaLogStore;

pub(crate) type TestResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn create_test_log_store() -> (TempDir, DeltaLogStore) {
    let tmp = TempDir::new().expect("create temp dir");
    let location = TableLocation::local(tmp.path());
    let store = DeltaLogStore::new(location);
    (tmp, store)
}

pub(crate) fn add(path: &str) -> String {
    format!(r#"{{"add":{{"path":"{path}","size":100,"partitionValues":{{}},"dataChange":true}}}}"#)
}

pub(crate) fn remove(path: &str) -> String {
    format!(r#"{{"remove":{{"path":"{path}","deletionTimestamp":1700000000000,"dataChange":true}}}}"#)
}

pub(crate) fn commit_info() -> String {
    r#"{"commitInfo":{"timestamp":1700000000000,"operation":"WRITE"}}"#.to_string()
}

pub(crate) fn write_raw_log_file(
    root: &Path,
    file_name: &str,
    contents: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = root.join(layout::LOG_DIR_NAME);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(file_name), contents)?;
    Ok(())
}

/// Write `_delta_log/<version>.json` with one record per line.
pub(crate) fn write_commit(
    root: &Path,
    version: u64,
    lines: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut contents = lines.join("\n");
    contents.push('\n');
    write_raw_log_file(root, &layout::commit_file_name(version), &contents)
}

pub(crate) fn write_last_checkpoint(
    root: &Path,
    version: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    write_raw_log_file(
        root,
        layout::LAST_CHECKPOINT_FILE_NAME,
        &format!(r#"{{"version":{version},"size":3}}"#),
    )
}

/// Write a checkpoint with one `add` row per path.
pub(crate) fn write_checkpoint(
    root: &Path,
    version: u64,
    paths: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<Option<Option<&str>>> = paths.iter().map(|p| Some(Some(*p))).collect();
    write_checkpoint_rows(root, version, &rows)
}

/// Write a checkpoint from raw rows: `None` is a row whose `add` is null
/// (for example a `metaData` or `remove` row), `Some(None)` is an `add`
/// struct with a null `path`.
pub(crate) fn write_checkpoint_rows(
    root: &Path,
    version: u64,
    rows: &[Option<Option<&str>>],
) -> Result<(), Box<dyn std::error::Error>> {
    let path_field = Arc::new(Field::new("path", DataType::Utf8, true));
    let add_fields = Fields::from(vec![path_field]);

    let paths: StringArray = rows.iter().map(|row| row.flatten()).collect();
    let validity = NullBuffer::from(rows.iter().map(Option::is_some).collect::<Vec<bool>>());
    let add = StructArray::new(
        add_fields.clone(),
        vec![Arc::new(paths) as ArrayRef],
        Some(validity),
    );

    let schema = Arc::new(Schema::new(vec![Field::new(
        "add",
        DataType::Struct(add_fields),
        true,
    )]));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(add) as ArrayRef])?;

    let dir = root.join(layout::LOG_DIR_NAME);
    std::fs::create_dir_all(&dir)?;
    let file = File::create(dir.join(layout::checkpoint_file_name(version)))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
