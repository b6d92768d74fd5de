use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use super::*;

fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 3, 7)
        .unwrap()
}

fn entry(id: &str, time: NaiveDateTime) -> LogEntry {
    LogEntry {
        id: id.into(),
        ip: "1.2.3.4".into(),
        event_time: time,
        name: "svc".into(),
        random_number: 42,
        process_time: None,
        delay_time: None,
    }
}

fn test_writer(dir: &TempDir) -> RotatingWriter {
    let config = RotatingWriterConfig::default()
        .with_directory(dir.path())
        .with_workers(2);
    RotatingWriter::new(config).unwrap()
}

// =============================================================================
// File naming
// =============================================================================

#[test]
fn test_file_name_format() {
    assert_eq!(
        file_name_for("client", ts(2024, 1, 1, 14)),
        "client_20240101_14.log"
    );
    assert_eq!(
        file_name_for("client", ts(2024, 12, 31, 5)),
        "client_20241231_05.log"
    );
}

// =============================================================================
// Directory setup
// =============================================================================

#[test]
fn test_directory_creation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs");

    let config = RotatingWriterConfig::default().with_directory(&path).with_workers(1);
    let first = RotatingWriter::new(config.clone()).unwrap();
    first.shutdown();

    // Constructing again over the existing directory must not error.
    let second = RotatingWriter::new(config).unwrap();
    second.shutdown();

    assert!(path.is_dir());
    assert_eq!(
        fs::read_dir(dir.path()).unwrap().count(),
        1,
        "exactly one directory expected"
    );
}

#[test]
fn test_directory_creation_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, b"not a directory").unwrap();

    let config = RotatingWriterConfig::default().with_directory(&blocker).with_workers(1);
    let err = RotatingWriter::new(config).unwrap_err();
    assert!(matches!(err, SinkError::CreateDir { .. }));
}

// =============================================================================
// Hour rotation
// =============================================================================

#[test]
fn test_hour_change_rotates_to_new_file() {
    let dir = TempDir::new().unwrap();
    let writer = test_writer(&dir);

    let hour_14 = ts(2024, 1, 1, 14);
    let hour_15 = ts(2024, 1, 1, 15);
    writer
        .shared
        .write_at(hour_14, &WriteJob::One(entry("first", hour_14)))
        .unwrap();
    writer
        .shared
        .write_at(hour_15, &WriteJob::One(entry("second", hour_15)))
        .unwrap();
    writer.shutdown();

    let file_14 = fs::read_to_string(dir.path().join("client_20240101_14.log")).unwrap();
    let file_15 = fs::read_to_string(dir.path().join("client_20240101_15.log")).unwrap();

    assert!(file_14.starts_with("first|"));
    assert!(!file_14.contains("second"));
    assert!(file_15.starts_with("second|"));
    assert!(!file_15.contains("first"));
}

#[test]
fn test_same_hour_reuses_current_file() {
    let dir = TempDir::new().unwrap();
    let writer = test_writer(&dir);

    let now = ts(2024, 1, 1, 14);
    for id in ["a", "b", "c"] {
        writer
            .shared
            .write_at(now, &WriteJob::One(entry(id, now)))
            .unwrap();
    }
    writer.shutdown();

    let content = fs::read_to_string(dir.path().join("client_20240101_14.log")).unwrap();
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_existing_file_from_prior_run_is_appended() {
    let dir = TempDir::new().unwrap();
    let now = ts(2024, 1, 1, 14);
    let path = dir.path().join(file_name_for("client", now));
    fs::write(&path, "previous|1.2.3.4|2024-01-01 14:00:00|svc|1|-|-\n").unwrap();

    let writer = test_writer(&dir);
    writer
        .shared
        .write_at(now, &WriteJob::One(entry("next", now)))
        .unwrap();
    writer.shutdown();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.starts_with("previous|"));
}

// =============================================================================
// Dispatch and drain
// =============================================================================

#[test]
fn test_write_one_lands_on_disk_after_shutdown_drain() {
    let dir = TempDir::new().unwrap();
    let writer = test_writer(&dir);
    let now = ts(2024, 1, 1, 14);

    writer.write_one(entry("queued", now)).unwrap();
    writer.shutdown();

    let lines: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("queued|"));
}

#[test]
fn test_write_many_is_one_batch_append() {
    let dir = TempDir::new().unwrap();
    let writer = test_writer(&dir);
    let now = ts(2024, 1, 1, 14);

    let batch = vec![entry("a", now), entry("b", now), entry("c", now)];
    writer.write_many(batch).unwrap();
    writer.shutdown();

    let snapshot = writer.metrics().snapshot();
    assert_eq!(snapshot.jobs_submitted, 1);
    assert_eq!(snapshot.lines_written, 3);

    let content: String = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_empty_batch_is_noop() {
    let dir = TempDir::new().unwrap();
    let writer = test_writer(&dir);

    writer.write_many(Vec::new()).unwrap();
    writer.shutdown();

    assert_eq!(writer.metrics().snapshot().jobs_submitted, 0);
}

#[test]
fn test_submit_after_shutdown_is_rejected() {
    let dir = TempDir::new().unwrap();
    let writer = test_writer(&dir);
    writer.shutdown();

    let now = ts(2024, 1, 1, 14);
    assert!(writer.write_one(entry("late", now)).is_err());
}

#[test]
fn test_shutdown_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let writer = test_writer(&dir);
    writer.shutdown();
    writer.shutdown();
}

#[test]
fn test_unset_optionals_render_sentinel_on_disk() {
    let dir = TempDir::new().unwrap();
    let writer = test_writer(&dir);
    let now = ts(2024, 1, 1, 14);

    writer.write_one(entry("s", now)).unwrap();
    writer.shutdown();

    let content: String = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    assert!(content.trim_end().ends_with("|42|-|-"));
}
