//! Integration tests for the Observer endpoints.
//!
//! Most tests use Axum's `Router` directly via `tower::ServiceExt`
//! without starting a TCP server. The `WebSocket` tests serve the router on
//! an ephemeral local port and connect a real client.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use meteo_core::{DeliveryError, HistoryRecorder, MemoryHistory, ObserverSink, Station};
use meteo_observer::router::build_router;
use meteo_observer::state::AppState;
use meteo_store::CsvHistory;
use meteo_types::{HistoryRecord, SensorDefinition, ThresholdEntry, ThresholdTable};
use futures::{SinkExt as _, StreamExt as _};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingSink {
    received: Mutex<Vec<Value>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<Value> {
        std::mem::take(&mut *self.received.lock().unwrap())
    }
}

impl ObserverSink for RecordingSink {
    fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        self.received
            .lock()
            .unwrap()
            .push(serde_json::from_str(payload).unwrap());
        Ok(())
    }
}

fn make_station(history: Arc<dyn HistoryRecorder>) -> Arc<Station> {
    let sensors = vec![
        SensorDefinition::new("temp", "Temperature", "°C", -10.0, 35.0).unwrap(),
        SensorDefinition::new("wind", "Wind speed", "m/s", 0.0, 25.0).unwrap(),
    ];
    let thresholds = ThresholdTable::new().with("temp", ThresholdEntry::between(-5.0, 30.0));
    Arc::new(Station::new(sensors, thresholds, history, 3.0).unwrap())
}

fn make_state() -> Arc<AppState> {
    let station = make_station(Arc::new(MemoryHistory::default()));
    Arc::new(AppState::new(station).unwrap())
}

fn make_file_state(path: &Path) -> Arc<AppState> {
    let history = Arc::new(CsvHistory::open(path).unwrap());
    let station = make_station(history);
    Arc::new(
        AppState::new(station)
            .unwrap()
            .with_history_file(path)
            .with_history_tail(3),
    )
}

fn record(idx: u32) -> HistoryRecord {
    HistoryRecord {
        time: format!("2024-06-01 12:00:{idx:02}"),
        sensor_id: "temp".to_owned(),
        name: "Temperature".to_owned(),
        value: f64::from(idx),
        unit: "°C".to_owned(),
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =========================================================================
// Dashboard
// =========================================================================

#[tokio::test]
async fn test_index_renders_sensors_and_interval() {
    let router = build_router(make_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.contains("text/html"));

    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("Temperature"));
    assert!(html.contains("Wind speed"));
    assert!(html.contains("id=\"card-temp\""));
    assert!(html.contains("step=\"0.5\" value=\"3"));
}

#[tokio::test]
async fn test_index_marks_paused_sensors() {
    let state = make_state();
    let _ = state.station.stop_sensor("wind").await;
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("class=\"card paused\" id=\"card-wind\""));
    assert!(html.contains("class=\"card\" id=\"card-temp\""));
}

#[tokio::test]
async fn test_sensor_snapshot() {
    let state = make_state();
    let _ = state.station.stop_sensor("temp").await;
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/sensors").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["interval_secs"], 3.0);
    assert_eq!(json["sensors"]["temp"]["active"], false);
    assert_eq!(json["sensors"]["wind"]["active"], true);
    assert_eq!(json["sensors"]["wind"]["unit"], "m/s");
}

// =========================================================================
// Operator controls
// =========================================================================

#[tokio::test]
async fn test_set_interval_clamps() {
    let state = make_state();
    let sink = Arc::new(RecordingSink::default());
    state.station.hub().register(sink.clone()).await;
    sink.take();

    for (requested, effective) in [(0.2, 0.5), (99.0, 10.0), (2.5, 2.5)] {
        let router = build_router(Arc::clone(&state));
        let response = router
            .oneshot(post_json(
                "/set-interval",
                &serde_json::json!({ "interval": requested }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["status"], "updated");
        assert_eq!(json["interval"], effective);
    }

    // One SYSTEM notice per command, each sent before the response.
    let events = sink.take();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e["level"] == "SYSTEM"));
    assert!((state.station.sampling().interval_secs() - 2.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_set_interval_rejects_malformed_body() {
    let router = build_router(make_state());
    let response = router
        .oneshot(post_json("/set-interval", &serde_json::json!({ "seconds": 1 })))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_stop_and_start_sensor() {
    let state = make_state();
    let sink = Arc::new(RecordingSink::default());
    state.station.hub().register(sink.clone()).await;
    sink.take();

    let response = build_router(Arc::clone(&state))
        .oneshot(post("/stop-sensor/wind"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["sensor_id"], "wind");
    assert_eq!(json["changed"], true);
    assert!(!state.station.sensor("wind").unwrap().is_active());

    let response = build_router(Arc::clone(&state))
        .oneshot(post("/start-sensor/wind"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["changed"], true);
    assert!(state.station.sensor("wind").unwrap().is_active());

    let messages: Vec<Value> = sink.take().into_iter().map(|e| e["message"].clone()).collect();
    assert_eq!(
        messages,
        vec![
            Value::from("Sensor 'Wind speed' stopped."),
            Value::from("Sensor 'Wind speed' started."),
        ]
    );
}

#[tokio::test]
async fn test_unknown_sensor_is_ignored() {
    let router = build_router(make_state());
    let response = router.oneshot(post("/stop-sensor/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["changed"], false);
}

#[tokio::test]
async fn test_stop_all_and_start_all() {
    let state = make_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(post("/stop-all"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["changed"], 2);
    assert!(state.station.snapshot().sensors.iter().all(|s| !s.active));

    let response = build_router(Arc::clone(&state))
        .oneshot(post("/stop-all"))
        .await
        .unwrap();
    assert_eq!(body_to_json(response.into_body()).await["changed"], 0);

    let response = build_router(Arc::clone(&state))
        .oneshot(post("/start-all"))
        .await
        .unwrap();
    assert_eq!(body_to_json(response.into_body()).await["changed"], 2);
}

// =========================================================================
// History
// =========================================================================

#[tokio::test]
async fn test_history_returns_recent_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_file_state(&dir.path().join("weather_history.csv"));
    for idx in 1..=5 {
        state.station.history().append(&record(idx)).unwrap();
    }

    let response = build_router(state)
        .oneshot(Request::get("/history").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Time"], "2024-06-01 12:00:05");
    assert_eq!(rows[0]["Sensor ID"], "temp");
    assert_eq!(rows[0]["Value"], 5.0);
    assert_eq!(rows[2]["Time"], "2024-06-01 12:00:03");
}

#[tokio::test]
async fn test_history_empty() {
    let response = build_router(make_state())
        .oneshot(Request::get("/history").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, Value::Array(Vec::new()));
}

#[tokio::test]
async fn test_download_log() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_file_state(&dir.path().join("weather_history.csv"));
    state.station.history().append(&record(7)).unwrap();

    let response = build_router(state)
        .oneshot(Request::get("/download-log").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert!(headers["content-type"].to_str().unwrap().starts_with("text/csv"));
    assert!(headers["content-disposition"]
        .to_str()
        .unwrap()
        .contains("weather_log.csv"));

    let csv = body_to_string(response.into_body()).await;
    assert!(csv.starts_with("Time,Sensor ID,Name,Value,Unit\n"));
    assert!(csv.contains("2024-06-01 12:00:07,temp,Temperature,7.0,°C"));
}

#[tokio::test]
async fn test_download_log_missing() {
    let response = build_router(make_state())
        .oneshot(Request::get("/download-log").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Log file not found");
}

#[tokio::test]
async fn test_clear_history() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_file_state(&dir.path().join("weather_history.csv"));
    state.station.history().append(&record(1)).unwrap();

    let response = build_router(Arc::clone(&state))
        .oneshot(
            Request::delete("/clear-history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "cleared");
    assert!(state.station.history().recent(10).unwrap().is_empty());
}

// =========================================================================
// WebSocket
// =========================================================================

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn serve(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    client
}

/// Next JSON text frame, skipping control frames.
async fn next_event(client: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn wait_for_observers(state: &AppState, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.station.hub().observer_count().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_ws_welcome_then_unregister_on_close() {
    let state = make_state();
    let addr = serve(Arc::clone(&state)).await;

    let mut client = connect(addr).await;
    let welcome = next_event(&mut client).await;
    assert_eq!(welcome["type"], "log");
    assert_eq!(welcome["level"], "SYSTEM");
    assert_eq!(welcome["message"], "Client connected. Update interval: 3.0s");
    assert_eq!(state.station.hub().observer_count().await, 1);

    client.close(None).await.unwrap();
    wait_for_observers(&state, 0).await;
}

#[tokio::test]
async fn test_ws_ignores_inbound_text_and_streams_events() {
    let state = make_state();
    let addr = serve(Arc::clone(&state)).await;

    let mut client = connect(addr).await;
    next_event(&mut client).await;

    client
        .send(Message::Text("{\"interval\": 1}".into()))
        .await
        .unwrap();
    state.station.set_interval(2.0).await;

    let event = next_event(&mut client).await;
    assert_eq!(event["level"], "SYSTEM");
    assert_eq!(event["message"], "Update interval changed to 2.0 s");
    assert!((state.station.sampling().interval_secs() - 2.0).abs() < 1e-9);
    assert_eq!(state.station.hub().observer_count().await, 1);
}

#[tokio::test]
async fn test_ws_dropped_client_is_unregistered() {
    let state = make_state();
    let addr = serve(Arc::clone(&state)).await;

    let mut first = connect(addr).await;
    next_event(&mut first).await;
    let mut second = connect(addr).await;
    next_event(&mut second).await;

    // The second connection's welcome also reaches the first.
    let shared = next_event(&mut first).await;
    assert_eq!(shared["message"], "Client connected. Update interval: 3.0s");
    wait_for_observers(&state, 2).await;

    drop(second);
    wait_for_observers(&state, 1).await;
}
