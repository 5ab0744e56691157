//! CSV-file implementation of the history recorder.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use meteo_core::{HistoryError, HistoryRecorder};
use meteo_types::HistoryRecord;
use tracing::{debug, warn};

use crate::error::{from_csv, from_poison};

/// Append-only CSV reading log.
#[derive(Debug)]
pub struct CsvHistory {
    path: PathBuf,
    /// Serializes every file access.
    lock: Mutex<()>,
}

impl CsvHistory {
    /// Open (or create) the history file at `path`.
    ///
    /// A missing or empty file is initialised with the header row.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let history = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };
        let file = history.open_for_append()?;
        if file.metadata()?.len() == 0 {
            write_header(file)?;
            debug!(path = %history.path.display(), "History file created");
        }
        Ok(history)
    }

    /// Location of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_for_append(&self) -> Result<File, HistoryError> {
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?)
    }
}

fn write_header(file: File) -> Result<(), HistoryError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(HistoryRecord::HEADER).map_err(from_csv)?;
    writer.flush()?;
    Ok(())
}

impl HistoryRecorder for CsvHistory {
    fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().map_err(|e| from_poison(&e))?;
        let file = self.open_for_append()?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HistoryRecord::HEADER).map_err(from_csv)?;
        }
        writer.serialize(record).map_err(from_csv)?;
        writer.flush()?;
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let _guard = self.lock.lock().map_err(|e| from_poison(&e))?;
        if limit == 0 || !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(from_csv)?;

        let mut tail = VecDeque::with_capacity(limit);
        for row in reader.deserialize::<HistoryRecord>() {
            match row {
                Ok(record) => {
                    if tail.len() == limit {
                        tail.pop_front();
                    }
                    tail.push_back(record);
                }
                Err(e) => warn!(error = %e, "Skipping malformed history row"),
            }
        }
        Ok(tail.into_iter().rev().collect())
    }

    fn truncate(&self) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().map_err(|e| from_poison(&e))?;
        write_header(File::create(&self.path)?)?;
        debug!(path = %self.path.display(), "History truncated");
        Ok(())
    }
}
