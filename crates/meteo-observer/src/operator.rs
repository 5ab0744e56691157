//! Operator endpoint handlers for runtime station control.
//!
//! Commands follow an operator-trust model: an out-of-range interval is
//! clamped and an unknown sensor id is ignored, never rejected.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/set-interval` | Set the sampling interval (seconds) |
//! | `POST` | `/start-sensor/{id}` | Resume one sensor |
//! | `POST` | `/stop-sensor/{id}` | Pause one sensor |
//! | `POST` | `/start-all` | Resume every sensor |
//! | `POST` | `/stop-all` | Pause every sensor |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /set-interval`.
#[derive(Debug, serde::Deserialize)]
pub struct SetIntervalRequest {
    /// Requested interval in seconds; clamped into `[0.5, 10.0]`.
    pub interval: f64,
}

/// Response for `POST /set-interval`.
#[derive(Debug, serde::Serialize)]
struct IntervalResponse {
    status: &'static str,
    interval: f64,
}

/// Response for the single-sensor commands.
#[derive(Debug, serde::Serialize)]
struct SensorCommandResponse {
    ok: bool,
    sensor_id: String,
    /// Whether the sensor actually changed state.
    changed: bool,
}

/// Response for the bulk commands.
#[derive(Debug, serde::Serialize)]
struct BulkCommandResponse {
    ok: bool,
    /// Number of sensors that changed state.
    changed: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Change the sampling interval. Takes effect from each generator's next sleep.
pub async fn set_interval(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetIntervalRequest>,
) -> impl IntoResponse {
    let interval = state.station.set_interval(body.interval).await;
    Json(IntervalResponse {
        status: "updated",
        interval,
    })
}

/// Resume one sensor.
pub async fn start_sensor(
    State(state): State<Arc<AppState>>,
    Path(sensor_id): Path<String>,
) -> impl IntoResponse {
    let changed = state.station.start_sensor(&sensor_id).await.unwrap_or(false);
    Json(SensorCommandResponse {
        ok: true,
        sensor_id,
        changed,
    })
}

/// Pause one sensor.
pub async fn stop_sensor(
    State(state): State<Arc<AppState>>,
    Path(sensor_id): Path<String>,
) -> impl IntoResponse {
    let changed = state.station.stop_sensor(&sensor_id).await.unwrap_or(false);
    Json(SensorCommandResponse {
        ok: true,
        sensor_id,
        changed,
    })
}

/// Resume every sensor.
pub async fn start_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let changed = state.station.start_all().await;
    Json(BulkCommandResponse { ok: true, changed })
}

/// Pause every sensor.
pub async fn stop_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let changed = state.station.stop_all().await;
    Json(BulkCommandResponse { ok: true, changed })
}
