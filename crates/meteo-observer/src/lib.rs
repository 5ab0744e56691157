//! Observer server for the Meteo telemetry station.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) streaming every log and data event
//!   through the station's broadcast hub
//! - **Dashboard page** (`GET /`) rendered with `minijinja` from the
//!   current station snapshot
//! - **Operator endpoints** for runtime control (sampling interval,
//!   start/stop one sensor or all of them)
//! - **History endpoints** (recent tail, CSV download, clear)
//!
//! # Architecture
//!
//! The observer is a thin transport layer over [`meteo_core::Station`].
//! Each `WebSocket` connection registers a bounded queue with the hub on
//! connect and unregisters it on disconnect; the hub never waits on a
//! socket, so a slow dashboard cannot stall the generators.

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use startup::spawn_observer;
pub use state::AppState;
