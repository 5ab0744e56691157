//! Reading history for the Meteo telemetry station.
//!
//! # Architecture
//!
//! The history is a single CSV file with a header row
//! (`Time,Sensor ID,Name,Value,Unit`) followed by one row per reading, in
//! generation order. [`CsvHistory`] implements the engine's
//! [`HistoryRecorder`](meteo_core::HistoryRecorder) seam:
//!
//! - **append** -- one row per generated reading, serialized by an
//!   internal lock so concurrent generators never interleave rows
//! - **recent** -- bounded tail read, most recent first
//! - **truncate** -- reset to the header row
//!
//! There is no compaction or indexing; the tail read streams the whole
//! file and keeps only the last `n` rows.

pub mod csv_history;
pub mod error;

pub use csv_history::CsvHistory;
