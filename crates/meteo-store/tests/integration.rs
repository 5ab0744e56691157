//! Integration tests for the CSV history store.
//!
//! Each test works in its own temporary directory.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::thread;

use meteo_core::HistoryRecorder;
use meteo_store::CsvHistory;
use meteo_types::HistoryRecord;

fn record(sensor_id: &str, idx: usize) -> HistoryRecord {
    HistoryRecord {
        time: format!("2024-03-01 10:{:02}:{:02}", idx / 60, idx % 60),
        sensor_id: sensor_id.to_owned(),
        name: format!("Sensor {sensor_id}"),
        value: f64::from(u32::try_from(idx).unwrap()) / 10.0,
        unit: "u".to_owned(),
    }
}

#[test]
fn recent_returns_bounded_tail_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let history = CsvHistory::open(dir.path().join("weather_history.csv")).unwrap();
    for idx in 0..120 {
        history.append(&record("temp", idx)).unwrap();
    }

    let recent = history.recent(50).unwrap();
    assert_eq!(recent.len(), 50);
    assert_eq!(recent.first(), Some(&record("temp", 119)));
    assert_eq!(recent.last(), Some(&record("temp", 70)));
}

#[test]
fn recent_on_short_file_returns_everything() {
    let dir = tempfile::tempdir().unwrap();
    let history = CsvHistory::open(dir.path().join("h.csv")).unwrap();
    history.append(&record("uv", 1)).unwrap();
    history.append(&record("uv", 2)).unwrap();

    let recent = history.recent(50).unwrap();
    assert_eq!(recent, vec![record("uv", 2), record("uv", 1)]);
    assert!(history.recent(0).unwrap().is_empty());
}

#[test]
fn truncate_keeps_only_header() {
    let dir = tempfile::tempdir().unwrap();
    let history = CsvHistory::open(dir.path().join("h.csv")).unwrap();
    history.append(&record("rain", 1)).unwrap();
    history.truncate().unwrap();

    assert!(history.recent(10).unwrap().is_empty());
    let contents = std::fs::read_to_string(history.path()).unwrap();
    assert_eq!(contents, "Time,Sensor ID,Name,Value,Unit\n");

    history.append(&record("rain", 2)).unwrap();
    assert_eq!(history.recent(10).unwrap(), vec![record("rain", 2)]);
}

#[test]
fn deleted_file_reads_empty_and_append_recreates_header() {
    let dir = tempfile::tempdir().unwrap();
    let history = CsvHistory::open(dir.path().join("h.csv")).unwrap();
    std::fs::remove_file(history.path()).unwrap();

    assert!(history.recent(10).unwrap().is_empty());
    history.append(&record("air", 3)).unwrap();
    let contents = std::fs::read_to_string(history.path()).unwrap();
    assert!(contents.starts_with("Time,Sensor ID,Name,Value,Unit\n"));
    assert_eq!(history.recent(10).unwrap(), vec![record("air", 3)]);
}

#[test]
fn malformed_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h.csv");
    std::fs::write(
        &path,
        "Time,Sensor ID,Name,Value,Unit\n\
         2024-03-01 10:00:00,temp,Temperature,not-a-number,°C\n\
         2024-03-01 10:00:01,temp,Temperature,21.5,°C\n",
    )
    .unwrap();
    let history = CsvHistory::open(&path).unwrap();

    let recent = history.recent(10).unwrap();
    assert_eq!(recent.len(), 1);
    assert!((recent[0].value - 21.5).abs() < f64::EPSILON);
    assert_eq!(recent[0].unit, "°C");
}

#[test]
fn concurrent_appends_never_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let history = Arc::new(CsvHistory::open(dir.path().join("h.csv")).unwrap());

    let handles: Vec<_> = ["temp", "wind", "uv", "air"]
        .into_iter()
        .map(|sensor| {
            let history = Arc::clone(&history);
            thread::spawn(move || {
                for idx in 0..50 {
                    history.append(&record(sensor, idx)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = history.recent(1_000).unwrap();
    assert_eq!(all.len(), 200);
    for sensor in ["temp", "wind", "uv", "air"] {
        assert_eq!(all.iter().filter(|r| r.sensor_id == sensor).count(), 50);
    }
}
