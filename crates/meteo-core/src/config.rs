//! Configuration loading and typed config structures for the Meteo station.
//!
//! The canonical configuration lives in `meteo-config.yaml` next to the
//! binary's working directory. This module defines strongly-typed structs
//! that mirror the YAML structure, and provides a loader that reads and
//! validates the file. Every section is optional; defaults reproduce the
//! stock seven-sensor weather station.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use meteo_types::{DefinitionError, SensorDefinition, ThresholdEntry, ThresholdTable};
use serde::Deserialize;
use tracing::warn;

use crate::sampling::{self, DEFAULT_INTERVAL_SECS};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<DefinitionError> for ConfigError {
    fn from(err: DefinitionError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Top-level station configuration.
///
/// Mirrors the structure of `meteo-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationConfig {
    /// Sampling and history settings.
    #[serde(default)]
    pub station: StationSection,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulated sensors, in fleet order.
    #[serde(default = "default_sensors")]
    pub sensors: Vec<SensorSpec>,

    /// Alert bounds keyed by sensor identifier.
    #[serde(default = "default_thresholds")]
    pub thresholds: ThresholdTable,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            station: StationSection::default(),
            server: ServerSection::default(),
            logging: LoggingConfig::default(),
            sensors: default_sensors(),
            thresholds: default_thresholds(),
        }
    }
}

impl StationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `METEO_HOST` overrides `server.host`
    /// - `METEO_PORT` overrides `server.port`
    /// - `METEO_HISTORY_PATH` overrides `station.history_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// The initial interval is clamped into the accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.station.initial_interval_secs =
            sampling::clamp_interval(config.station.initial_interval_secs)
                .unwrap_or(DEFAULT_INTERVAL_SECS);
        Ok(config)
    }

    /// Apply `METEO_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("METEO_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("METEO_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!(value = %val, error = %e, "Ignoring invalid METEO_PORT"),
            }
        }
        if let Ok(val) = std::env::var("METEO_HISTORY_PATH") {
            self.station.history_path = PathBuf::from(val);
        }
    }

    /// Build validated sensor definitions in fleet order.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for the first invalid sensor.
    pub fn sensor_definitions(&self) -> Result<Vec<SensorDefinition>, DefinitionError> {
        self.sensors.iter().map(SensorSpec::to_definition).collect()
    }

    /// Check that every sensor is valid and identifiers are unique.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for spec in &self.sensors {
            spec.to_definition()?;
            if !seen.insert(spec.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate sensor identifier: {}",
                    spec.id
                )));
            }
        }
        if self.station.history_tail == 0 {
            return Err(ConfigError::Invalid(
                "station.history_tail must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Sampling and history settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationSection {
    /// Sampling interval at startup, seconds.
    #[serde(default = "default_initial_interval_secs")]
    pub initial_interval_secs: f64,

    /// History CSV file location.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Number of records returned by the history endpoint.
    #[serde(default = "default_history_tail")]
    pub history_tail: usize,
}

impl Default for StationSection {
    fn default() -> Self {
        Self {
            initial_interval_secs: default_initial_interval_secs(),
            history_path: default_history_path(),
            history_tail: default_history_tail(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Output format for process logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// One sensor as written in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorSpec {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit label.
    pub unit: String,
    /// Lowest generatable value.
    pub min: f64,
    /// Highest generatable value.
    pub max: f64,
}

impl SensorSpec {
    fn new(id: &str, name: &str, unit: &str, min: f64, max: f64) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            unit: unit.to_owned(),
            min,
            max,
        }
    }

    /// Validate into a [`SensorDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the bounds or id are invalid.
    pub fn to_definition(&self) -> Result<SensorDefinition, DefinitionError> {
        SensorDefinition::new(
            self.id.clone(),
            self.name.clone(),
            self.unit.clone(),
            self.min,
            self.max,
        )
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_initial_interval_secs() -> f64 {
    DEFAULT_INTERVAL_SECS
}

fn default_history_path() -> PathBuf {
    PathBuf::from("weather_history.csv")
}

const fn default_history_tail() -> usize {
    50
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_sensors() -> Vec<SensorSpec> {
    vec![
        SensorSpec::new("temp", "Temperature", "°C", -10.0, 35.0),
        SensorSpec::new("humid", "Humidity", "%", 20.0, 90.0),
        SensorSpec::new("wind", "Wind speed", "m/s", 0.0, 25.0),
        SensorSpec::new("press", "Pressure", "hPa", 980.0, 1050.0),
        SensorSpec::new("uv", "UV index", "idx", 0.0, 11.0),
        SensorSpec::new("rain", "Rainfall", "mm", 0.0, 50.0),
        SensorSpec::new("air", "Air quality", "AQI", 0.0, 150.0),
    ]
}

fn default_thresholds() -> ThresholdTable {
    ThresholdTable::new()
        .with("temp", ThresholdEntry::between(-5.0, 30.0))
        .with("wind", ThresholdEntry::upper(15.0))
        .with("uv", ThresholdEntry::upper(8.0))
        .with("air", ThresholdEntry::upper(100.0))
}
