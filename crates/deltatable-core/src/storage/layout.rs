//! On-disk layout helpers for a table root.
//!
//! This module centralizes all *relative* path conventions under a table root:
//!
//! ```text
//! table_root/
//!   _delta_log/
//!     _last_checkpoint                             # {"version": 10, ...}
//!     00000000000000000000.json                    # log entry, version 0
//!     ...
//!     00000000000000000010.checkpoint.parquet      # checkpoint at version 10
//!     00000000000000000010.json
//!     00000000000000000011.json
//!   part-00000-....parquet                         # data files
//! ```
//!
//! Versions are encoded as fixed-width, zero-padded decimal names so that
//! lexical order on file names equals numeric order on versions. The encode
//! and decode directions live side by side ([`version_to_name`] /
//! [`name_to_version`]) and every reader and writer path goes through them.
//!
//! The functions here return relative [`PathBuf`] values. Callers join them
//! with a [`crate::storage::TableLocation`] before doing IO.

use std::path::PathBuf;

use snafu::prelude::*;

/// Name of the subdirectory containing the transaction log.
pub const LOG_DIR_NAME: &str = "_delta_log";

/// Name of the file pointing at the latest checkpoint.
pub const LAST_CHECKPOINT_FILE_NAME: &str = "_last_checkpoint";

/// Number of digits used in zero-padded version file names.
pub const VERSION_DIGITS: usize = 20;

/// Checkpoints are written every `CHECKPOINT_INTERVAL` versions.
pub const CHECKPOINT_INTERVAL: u64 = 10;

/// Suffix of a per-version log entry file.
pub const COMMIT_SUFFIX: &str = ".json";

/// Suffix of a (single-part) checkpoint file.
pub const CHECKPOINT_SUFFIX: &str = ".checkpoint.parquet";

/// Errors from decoding a fixed-width version name.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum VersionNameError {
    /// The name is not exactly [`VERSION_DIGITS`] characters long.
    #[snafu(display("Version name {name:?} has {len} characters, expected {VERSION_DIGITS}"))]
    WrongLength {
        /// The rejected name.
        name: String,
        /// Its length in bytes.
        len: usize,
    },

    /// The name contains something other than ASCII digits.
    #[snafu(display("Version name {name:?} contains a non-digit character"))]
    NonDigit {
        /// The rejected name.
        name: String,
    },

    /// The digits do not fit in a `u64`.
    #[snafu(display("Version name {name:?} overflows a 64-bit version"))]
    Overflow {
        /// The rejected name.
        name: String,
    },
}

/// Encode a version as its zero-padded, fixed-width name.
pub fn version_to_name(version: u64) -> String {
    format!("{version:0width$}", width = VERSION_DIGITS)
}

/// Decode a fixed-width version name produced by [`version_to_name`].
///
/// The input must be exactly [`VERSION_DIGITS`] ASCII digits.
pub fn name_to_version(name: &str) -> Result<u64, VersionNameError> {
    ensure!(
        name.len() == VERSION_DIGITS,
        WrongLengthSnafu {
            name,
            len: name.len(),
        }
    );
    ensure!(name.bytes().all(|b| b.is_ascii_digit()), NonDigitSnafu { name });

    name.parse::<u64>().ok().context(OverflowSnafu { name })
}

/// File name of the log entry for `version`, e.g. `00000000000000000007.json`.
pub fn commit_file_name(version: u64) -> String {
    format!("{}{COMMIT_SUFFIX}", version_to_name(version))
}

/// Recognize a log entry file name and return its version.
///
/// Checkpoint files, CRC files, the checkpoint pointer, and temp files all
/// return `None`.
pub fn parse_commit_file_name(file_name: &str) -> Option<u64> {
    let stem = file_name.strip_suffix(COMMIT_SUFFIX)?;
    name_to_version(stem).ok()
}

/// File name of the checkpoint for `version`.
pub fn checkpoint_file_name(version: u64) -> String {
    format!("{}{CHECKPOINT_SUFFIX}", version_to_name(version))
}

/// Relative path: `_delta_log/`
pub fn log_rel_dir() -> PathBuf {
    PathBuf::from(LOG_DIR_NAME)
}

/// Relative path: `_delta_log/_last_checkpoint`
pub fn last_checkpoint_rel_path() -> PathBuf {
    log_rel_dir().join(LAST_CHECKPOINT_FILE_NAME)
}

/// Relative path: `_delta_log/<zero-padded>.json`
pub fn commit_rel_path(version: u64) -> PathBuf {
    log_rel_dir().join(commit_file_name(version))
}

/// Relative path: `_delta_log/<zero-padded>.checkpoint.parquet`
pub fn checkpoint_rel_path(version: u64) -> PathBuf {
    log_rel_dir().join(checkpoint_file_name(version))
}

/// Version of the checkpoint that covers `version`.
///
/// Checkpoints sit on multiples of [`CHECKPOINT_INTERVAL`], so this rounds
/// down: `0..=9 -> 0`, `10..=19 -> 10`, ...
pub fn checkpoint_for_version(version: u64) -> u64 {
    version - version % CHECKPOINT_INTERVAL
}

/// Name prefix shared by every version in the checkpoint interval that starts
/// at `checkpoint_version`.
///
/// With an interval of 10 the versions `c..=c+9` differ only in the last
/// digit of their name, so the prefix is the name without that digit.
pub fn decade_prefix(checkpoint_version: u64) -> String {
    let mut name = version_to_name(checkpoint_version);
    name.truncate(VERSION_DIGITS - 1);
    name
}
