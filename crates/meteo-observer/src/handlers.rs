//! Dashboard and history endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Dashboard page |
//! | `GET` | `/api/sensors` | Station snapshot |
//! | `GET` | `/history` | Recent readings, newest first |
//! | `GET` | `/download-log` | History file as CSV attachment |
//! | `DELETE` | `/clear-history` | Truncate the history |

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::Json;
use meteo_types::HistoryRecord;
use tracing::{info, warn};

use crate::error::ObserverError;
use crate::state::{AppState, INDEX_TEMPLATE};

/// File name offered for the history download.
const DOWNLOAD_FILE_NAME: &str = "weather_log.csv";

// ---------------------------------------------------------------------------
// GET / -- dashboard
// ---------------------------------------------------------------------------

/// Render the dashboard with the current sensor states and interval.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.station.snapshot();
    let template = state.templates().get_template(INDEX_TEMPLATE)?;
    let page = template.render(minijinja::context! {
        sensors => snapshot.sensors,
        current_interval => snapshot.interval_secs,
    })?;
    Ok(Html(page))
}

// ---------------------------------------------------------------------------
// GET /api/sensors
// ---------------------------------------------------------------------------

/// Current interval and per-sensor state, keyed by sensor id.
pub async fn sensors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.station.snapshot();
    Json(serde_json::json!({
        "interval_secs": snapshot.interval_secs,
        "sensors": snapshot.sensor_map(),
    }))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// The most recent readings, newest first.
///
/// Read failures are logged and served as an empty list.
pub async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryRecord>> {
    let recorder = Arc::clone(state.station.history());
    let tail = state.history_tail();
    match tokio::task::spawn_blocking(move || recorder.recent(tail)).await {
        Ok(Ok(records)) => Json(records),
        Ok(Err(e)) => {
            warn!(error = %e, "Failed to read history");
            Json(Vec::new())
        }
        Err(e) => {
            warn!(error = %e, "History read task failed");
            Json(Vec::new())
        }
    }
}

/// Serve the history file as a CSV attachment.
pub async fn download_log(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let not_found = || ObserverError::NotFound("Log file not found".to_owned());
    let path = state.history_file().ok_or_else(not_found)?;
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(ObserverError::Internal(format!("failed to read log: {e}"))),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        bytes,
    ))
}

/// Truncate the history, keeping only the header row.
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let recorder = Arc::clone(state.station.history());
    tokio::task::spawn_blocking(move || recorder.truncate())
        .await
        .map_err(|e| ObserverError::Internal(format!("history task failed: {e}")))??;
    info!("History cleared");
    Ok(Json(serde_json::json!({ "status": "cleared" })))
}
