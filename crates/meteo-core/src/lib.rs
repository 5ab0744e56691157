//! Live telemetry engine for the Meteo station.
//!
//! This crate owns everything with real concurrency: one periodic
//! generator task per sensor, the runtime-adjustable sampling interval
//! they all share, threshold alerting on every reading, and the fan-out
//! hub that pushes events to every connected observer.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `meteo-config.yaml` into
//!   strongly-typed structs.
//! - [`sampling`] -- The shared [`SamplingController`].
//! - [`threshold`] -- Pure threshold evaluation.
//! - [`hub`] -- [`BroadcastHub`] and the [`ObserverSink`] seam.
//! - [`history`] -- [`HistoryRecorder`] seam and an in-memory recorder.
//! - [`sensor`] -- The per-sensor generator task.
//! - [`station`] -- Operator command surface and the supervised fleet.
//!
//! [`SamplingController`]: sampling::SamplingController
//! [`BroadcastHub`]: hub::BroadcastHub
//! [`ObserverSink`]: hub::ObserverSink
//! [`HistoryRecorder`]: history::HistoryRecorder

pub mod config;
pub mod history;
pub mod hub;
pub mod sampling;
pub mod sensor;
pub mod station;
pub mod threshold;

pub use config::{ConfigError, StationConfig};
pub use history::{HistoryError, HistoryRecorder, MemoryHistory};
pub use hub::{BroadcastHub, DeliveryError, ObserverSink};
pub use sampling::SamplingController;
pub use sensor::SensorWorker;
pub use station::{FleetHandle, Station, StationError};
