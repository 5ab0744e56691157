//! Axum router construction for the Observer server.
//!
//! Assembles all routes (dashboard, REST, `WebSocket`) into a single
//! [`Router`] with CORS and request tracing enabled.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- dashboard page
/// - `GET /ws` -- `WebSocket` event stream
/// - `GET /history` -- most recent readings, newest first
/// - `GET /download-log` -- full history as a CSV attachment
/// - `DELETE /clear-history` -- truncate the history
/// - `GET /api/sensors` -- station snapshot
/// - `POST /set-interval` -- change the sampling interval
/// - `POST /start-sensor/{id}`, `POST /stop-sensor/{id}` -- one sensor
/// - `POST /start-all`, `POST /stop-all` -- every sensor
///
/// CORS is configured to allow any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_events))
        // History
        .route("/history", get(handlers::history))
        .route("/download-log", get(handlers::download_log))
        .route("/clear-history", delete(handlers::clear_history))
        .route("/api/sensors", get(handlers::sensors))
        // Operator controls
        .route("/set-interval", post(operator::set_interval))
        .route("/start-sensor/{id}", post(operator::start_sensor))
        .route("/stop-sensor/{id}", post(operator::stop_sensor))
        .route("/start-all", post(operator::start_all))
        .route("/stop-all", post(operator::stop_all))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
