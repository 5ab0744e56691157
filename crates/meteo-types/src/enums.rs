//! Enumeration types for the Meteo telemetry station.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Severity of a log event pushed to observers.
///
/// Serialized in upper case (`"SYSTEM"`, `"INFO"`, ...) to match the
/// dashboard's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum LogLevel {
    /// Station-level notices (observer connected, interval changed).
    System,
    /// Routine sensor lifecycle notices.
    Info,
    /// Threshold alerts.
    Warning,
    /// Failures shown to the operator. The station never emits this
    /// level; internal failures go to process logs.
    Error,
}

impl LogLevel {
    /// Wire name of the level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one reading against its threshold entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// The reading is strictly greater than the configured maximum.
    AboveMax,
    /// The reading is strictly lower than the configured minimum.
    BelowMin,
    /// No bound was violated, or the sensor has no threshold entry.
    None,
}
