//! Shared type definitions for the Meteo telemetry station.
//!
//! This crate is the single source of truth for the data model shared by
//! the telemetry engine, the history store and the observer server. Wire
//! types flow downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Enumeration types (log severity, alert classification)
//! - [`structs`] -- Sensor definitions, threshold table, snapshots
//! - [`events`] -- Wire events pushed to observers and history records
//! - [`error`] -- Validation errors for sensor definitions

pub mod enums;
pub mod error;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AlertKind, LogLevel};
pub use error::DefinitionError;
pub use events::{DataEvent, Event, HistoryRecord, LogEvent};
pub use ids::ObserverId;
pub use structs::{SensorDefinition, SensorSnapshot, StationSnapshot, ThresholdEntry, ThresholdTable};
