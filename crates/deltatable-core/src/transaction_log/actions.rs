//! Log entry decoding.
//!
//! Each `_delta_log/<version>.json` file holds newline-delimited JSON objects.
//! A record is keyed by its action kind:
//!
//! ```json
//! {"commitInfo":{"timestamp":1700000000000,"operation":"WRITE"}}
//! {"add":{"path":"part-00000.parquet","size":1024,"dataChange":true}}
//! {"remove":{"path":"part-00001.parquet","deletionTimestamp":1700000000000}}
//! ```
//!
//! Only `add` and `remove` affect the live file set; everything else decodes
//! to [`LogEntry::Other`]. Decoding is strict: a line that is not a JSON
//! object, or an `add`/`remove` without a string `path`, is an error and the
//! whole replay aborts.
use serde::Deserialize;
use serde_json::{Map, Value};
use snafu::prelude::*;

use crate::transaction_log::{CorruptLogEntrySnafu, DeltaLogError};

/// One decoded log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A data file becomes live.
    Add {
        /// Table-relative path of the data file.
        path: String,
    },
    /// A data file stops being live.
    Remove {
        /// Table-relative path of the data file.
        path: String,
    },
    /// Any other record kind (`commitInfo`, `metaData`, `protocol`, `txn`, ...).
    Other,
}

/// Why a single line failed to decode.
#[derive(Debug, Snafu)]
pub enum LogEntryError {
    /// The line is not a JSON object.
    #[snafu(display("invalid JSON object: {source}"))]
    InvalidJson {
        /// Parser error.
        source: serde_json::Error,
    },

    /// An `add` or `remove` record is missing its `path`, or it is not a string.
    #[snafu(display("invalid {kind} action: {source}"))]
    InvalidAction {
        /// `add` or `remove`.
        kind: &'static str,
        /// Parser error.
        source: serde_json::Error,
    },

    /// A single record carries both an `add` and a `remove`.
    #[snafu(display("record carries both an add and a remove action"))]
    ConflictingActions,
}

#[derive(Deserialize)]
struct FileAction {
    path: String,
}

fn take_file_action(
    record: &mut Map<String, Value>,
    kind: &'static str,
) -> Result<Option<String>, LogEntryError> {
    match record.remove(kind) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let action: FileAction =
                serde_json::from_value(value).context(InvalidActionSnafu { kind })?;
            Ok(Some(action.path))
        }
    }
}

/// Decode one raw log line.
///
/// Returns `Ok(None)` for blank lines, which carry no record.
pub fn decode_line(line: &str) -> Result<Option<LogEntry>, LogEntryError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let mut record: Map<String, Value> = serde_json::from_str(line).context(InvalidJsonSnafu)?;

    let add = take_file_action(&mut record, "add")?;
    let remove = take_file_action(&mut record, "remove")?;

    let entry = match (add, remove) {
        (Some(path), None) => LogEntry::Add { path },
        (None, Some(path)) => LogEntry::Remove { path },
        (None, None) => LogEntry::Other,
        (Some(_), Some(_)) => return ConflictingActionsSnafu.fail(),
    };

    Ok(Some(entry))
}

/// Decode every record of the log file for `version`, in file order.
///
/// The first undecodable line aborts with [`DeltaLogError::CorruptLogEntry`].
pub fn decode_log(contents: &str, version: u64) -> Result<Vec<LogEntry>, DeltaLogError> {
    let mut entries = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let decoded = decode_line(line).map_err(|e| {
            CorruptLogEntrySnafu {
                version,
                line: idx + 1,
                msg: e.to_string(),
            }
            .build()
        })?;

        if let Some(entry) = decoded {
            entries.push(entry);
        }
    }

    Ok(entries)
}
