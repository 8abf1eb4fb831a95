//! End-to-end snapshot resolution through `DeltaTable`.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::*;
use deltatable_core::storage::{TableLocation, layout};
use deltatable_core::table::{DeltaTable, ResolveMode, TableError, TableOptions};
use deltatable_core::transaction_log::{DeltaLogError, VersionPolicy};
use tempfile::TempDir;

fn files(table: &DeltaTable) -> Vec<String> {
    table.files().iter().map(str::to_string).collect()
}

async fn open(tmp: &TempDir) -> Result<DeltaTable, TableError> {
    DeltaTable::open(TableLocation::local(tmp.path())).await
}

#[tokio::test]
async fn version_zero_is_exactly_its_adds() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[metadata(), add("A"), add("B")])?;

    let table = open(&tmp).await?;
    assert_eq!(table.version(), 0);
    assert_eq!(files(&table), vec!["A", "B"]);
    assert_eq!(table.snapshot().checkpoint_version(), 0);
    Ok(())
}

#[tokio::test]
async fn detached_resolution_is_idempotent_and_monotonic() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("A")])?;
    commit(tmp.path(), 1, &[add("B")])?;
    commit(tmp.path(), 2, &[add("C")])?;

    let mut table = open(&tmp).await?;
    let first = table.as_version(1, ResolveMode::Detached).await?;
    let again = table.as_version(1, ResolveMode::Detached).await?;
    assert_eq!(first, again);

    let next = table.as_version(2, ResolveMode::Detached).await?;
    assert_eq!(next.files().len(), first.files().len() + 1);
    assert!(first.files().iter().all(|p| next.files().contains(p)));
    assert!(next.files().contains("C"));
    assert_eq!(table.version(), 2);
    Ok(())
}

#[tokio::test]
async fn remove_after_add() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("A")])?;
    commit(tmp.path(), 1, &[remove("A")])?;

    let mut table = open(&tmp).await?;
    assert!(table.files().is_empty());

    table.as_version(0, ResolveMode::InPlace).await?;
    assert_eq!(files(&table), vec!["A"]);
    Ok(())
}

#[tokio::test]
async fn checkpoint_replaces_earlier_log_entries() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("old")])?;
    // Never read: the checkpoint at 10 covers versions 0 through 10.
    std::fs::write(
        tmp.path()
            .join(layout::LOG_DIR_NAME)
            .join(layout::commit_file_name(5)),
        "garbage",
    )?;
    checkpoint(tmp.path(), 10, &["A", "B"])?;
    last_checkpoint(tmp.path(), 10)?;
    commit(tmp.path(), 11, &[add("C")])?;

    let mut table = open(&tmp).await?;
    assert_eq!(table.version(), 11);
    assert_eq!(files(&table), vec!["A", "B", "C"]);

    let at_ten = table.as_version(10, ResolveMode::Detached).await?;
    assert_eq!(at_ten.checkpoint_version(), 10);
    assert_eq!(at_ten.files().len(), 2);
    Ok(())
}

#[tokio::test]
async fn removing_an_absent_path_changes_nothing() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("A")])?;
    commit(tmp.path(), 1, &[remove("never-added")])?;

    let table = open(&tmp).await?;
    assert_eq!(table.version(), 1);
    assert_eq!(files(&table), vec!["A"]);
    Ok(())
}

#[tokio::test]
async fn newest_version_is_highest_entry_in_checkpoint_interval() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("A")])?;
    checkpoint(tmp.path(), 20, &["A"])?;
    last_checkpoint(tmp.path(), 20)?;

    let mut table = open(&tmp).await?;
    assert_eq!(table.version(), 20);

    for version in 21..=23 {
        commit(tmp.path(), version, &[add(&format!("f{version}"))])?;
    }
    assert_eq!(table.update().await?, 23);
    assert_eq!(table.files().len(), 4);
    Ok(())
}

#[tokio::test]
async fn open_requires_log_entry_zero() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 1, &[add("A")])?;

    let err = open(&tmp).await.expect_err("no version 0");
    assert!(matches!(
        err.as_log_error(),
        Some(DeltaLogError::NotADeltaTable { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn corrupt_entry_fails_and_keeps_handle() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("A")])?;

    let mut table = open(&tmp).await?;
    std::fs::write(
        tmp.path()
            .join(layout::LOG_DIR_NAME)
            .join(layout::commit_file_name(1)),
        "{\"add\":",
    )?;

    let err = table.update().await.expect_err("version 1 is corrupt");
    assert!(matches!(
        err.as_log_error(),
        Some(DeltaLogError::CorruptLogEntry {
            version: 1,
            line: 1,
            ..
        })
    ));
    assert_eq!(table.version(), 0);
    assert_eq!(files(&table), vec!["A"]);
    Ok(())
}

#[tokio::test]
async fn explicit_version_without_checkpoint_file_fails() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("A")])?;
    commit(tmp.path(), 11, &[add("B")])?;

    let mut table = open(&tmp).await?;
    let err = table
        .as_version(11, ResolveMode::InPlace)
        .await
        .expect_err("checkpoint 10 is missing");
    assert!(matches!(
        err.as_log_error(),
        Some(DeltaLogError::MissingCheckpointFile { version: 10, .. })
    ));
    Ok(())
}

#[tokio::test]
async fn future_version_follows_policy() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("A")])?;
    commit(tmp.path(), 1, &[add("B")])?;

    let table = open(&tmp).await?;
    let err = table.at_version(4).await.expect_err("version 4 is not written");
    assert!(matches!(
        err.as_log_error(),
        Some(DeltaLogError::VersionNotYetAvailable {
            requested: 4,
            latest: 1,
            ..
        })
    ));

    let clamped = DeltaTable::open_at_version(
        TableLocation::local(tmp.path()),
        4,
        TableOptions::default().with_version_policy(VersionPolicy::Clamp),
    )
    .await?;
    assert_eq!(clamped.version(), 1);
    Ok(())
}

#[tokio::test]
async fn table_location_parses_file_uris() -> TestResult {
    let tmp = TempDir::new()?;
    commit(tmp.path(), 0, &[add("A")])?;

    let uri = format!("file://{}", tmp.path().display());
    let table = DeltaTable::open(TableLocation::parse(&uri)?).await?;
    assert_eq!(table.file_paths(), vec![tmp.path().join("A")]);

    assert!(TableLocation::parse("s3://bucket/table").is_err());
    Ok(())
}
