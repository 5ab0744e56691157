//! Meteo station binary.
//!
//! Wires the sensor fleet, the CSV history file and the observer server
//! together, then runs until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`METEO_CONFIG`, else `meteo-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the history file
//! 4. Build the station and spawn one generator per sensor
//! 5. Start the observer HTTP + `WebSocket` server
//! 6. Wait for Ctrl-C, then stop the fleet and the server

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use meteo_core::config::LogFormat;
use meteo_core::{Station, StationConfig};
use meteo_observer::{AppState, ServerConfig};
use meteo_store::CsvHistory;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file used when `METEO_CONFIG` is unset.
const DEFAULT_CONFIG_FILE: &str = "meteo-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so report the source after.
    let path = config_path();
    let (config, from_file) = load_config(&path)?;

    // 2. Initialize structured logging.
    init_tracing(&config);
    info!("meteo-engine starting");
    if from_file {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }
    info!(
        sensors = config.sensors.len(),
        initial_interval_secs = config.station.initial_interval_secs,
        history_path = %config.station.history_path.display(),
        "Station configuration"
    );

    // 3. Open the history file.
    let history = Arc::new(CsvHistory::open(&config.station.history_path)?);
    info!("History file ready");

    // 4. Build the station and start the fleet.
    let station = Arc::new(Station::from_config(&config, history)?);
    let fleet = station.spawn();

    // 5. Start the observer server.
    let app_state = Arc::new(
        AppState::new(Arc::clone(&station))?
            .with_history_file(config.station.history_path)
            .with_history_tail(config.station.history_tail),
    );
    let server_config = ServerConfig::from(&config.server);
    let observer_handle = meteo_observer::spawn_observer(server_config, app_state)?;

    // 6. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    fleet.shutdown().await;
    observer_handle.abort();
    info!("meteo-engine shutdown complete");

    Ok(())
}

/// Resolve the configuration file location.
fn config_path() -> PathBuf {
    std::env::var_os("METEO_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

/// Load and validate configuration from `path`.
///
/// A missing file yields the default station. Environment overrides
/// apply either way. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(StationConfig, bool), EngineError> {
    let (config, from_file) = if path.exists() {
        (StationConfig::from_file(path)?, true)
    } else {
        let mut config = StationConfig::default();
        config.apply_env_overrides();
        (config, false)
    };
    config.validate()?;
    Ok((config, from_file))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(config: &StationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
