//! History recorder seam.
//!
//! The durable history log lives outside the engine (see the
//! `meteo-store` crate). Generators only need [`HistoryRecorder::append`];
//! the tail read and truncate operations serve the observer endpoints.
//!
//! [`MemoryHistory`] is a bounded in-memory recorder for tests and
//! ephemeral runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use meteo_types::HistoryRecord;

/// Errors raised by a history recorder.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The underlying file could not be read or written.
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded.
    #[error("history format error: {0}")]
    Format(String),

    /// The recorder's internal lock was poisoned by a panicking writer.
    #[error("history lock poisoned: {0}")]
    Lock(String),
}

/// Append-only log of every generated reading.
///
/// Implementations must be safe to call from several generator tasks at
/// once. Calls are blocking; async callers should run them on the
/// blocking pool.
pub trait HistoryRecorder: Send + Sync {
    /// Durably append one record.
    fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError>;

    /// Return up to `limit` records, most recent first.
    fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError>;

    /// Drop every stored record.
    fn truncate(&self) -> Result<(), HistoryError>;
}

impl core::fmt::Debug for dyn HistoryRecorder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HistoryRecorder")
    }
}

/// Default number of records kept by [`MemoryHistory`].
const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

/// In-memory history with a fixed capacity; the oldest records are evicted.
#[derive(Debug)]
pub struct MemoryHistory {
    capacity: usize,
    records: Mutex<VecDeque<HistoryRecord>>,
}

impl MemoryHistory {
    /// Create a recorder holding at most `capacity` records.
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().map_or(0, |records| records.len())
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }
}

impl HistoryRecorder for MemoryHistory {
    fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))?;
        records.push_back(record.clone());
        while records.len() > self.capacity {
            records.pop_front();
        }
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let records = self
            .records
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))?;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn truncate(&self) -> Result<(), HistoryError> {
        self.records
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))?
            .clear();
        Ok(())
    }
}
