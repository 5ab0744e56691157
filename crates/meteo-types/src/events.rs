//! Wire events pushed to observers, and the history record shape.
//!
//! Events are transient: they are built at the moment of the triggering
//! action, serialized once, handed to the broadcast hub, and dropped. Only
//! data events leave a trace, as a [`HistoryRecord`] appended to the
//! history store.
//!
//! Wire shapes (one JSON text message per event):
//!
//! ```json
//! {"type": "log", "time": "HH:MM:SS", "level": "INFO", "message": "..."}
//! {"type": "data", "sensor_id": "temp", "name": "...", "value": 21.4, "unit": "°C", "timestamp": "HH:MM:SS"}
//! ```

use core::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::LogLevel;
use crate::structs::SensorDefinition;

/// Clock format used on the wire.
pub const WIRE_TIME_FORMAT: &str = "%H:%M:%S";

/// Date-time format used in history records.
pub const HISTORY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An event broadcast to every connected observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Event {
    /// Human-readable log line.
    Log(LogEvent),
    /// One sensor reading.
    Data(DataEvent),
}

impl Event {
    /// Serialize to the JSON text sent over the wire.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization fails, which cannot happen
    /// for well-formed events.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<LogEvent> for Event {
    fn from(event: LogEvent) -> Self {
        Self::Log(event)
    }
}

impl From<DataEvent> for Event {
    fn from(event: DataEvent) -> Self {
        Self::Data(event)
    }
}

/// A log line shown in the dashboard console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEvent {
    /// Wall-clock time, `HH:MM:SS`.
    pub time: String,
    /// Severity.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
}

impl LogEvent {
    /// Build a log event stamped with `at`.
    pub fn new<Tz>(at: &DateTime<Tz>, level: LogLevel, message: impl Into<String>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            time: at.format(WIRE_TIME_FORMAT).to_string(),
            level,
            message: message.into(),
        }
    }
}

/// One sensor reading as seen by observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DataEvent {
    /// Sensor identifier.
    pub sensor_id: String,
    /// Sensor display name.
    pub name: String,
    /// Reading, rounded to one decimal place.
    pub value: f64,
    /// Unit label.
    pub unit: String,
    /// Wall-clock time, `HH:MM:SS`.
    pub timestamp: String,
}

impl DataEvent {
    /// Build a data event for `sensor` stamped with `at`.
    pub fn new<Tz>(at: &DateTime<Tz>, sensor: &SensorDefinition, value: f64) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            sensor_id: sensor.id().to_owned(),
            name: sensor.name().to_owned(),
            value,
            unit: sensor.unit().to_owned(),
            timestamp: at.format(WIRE_TIME_FORMAT).to_string(),
        }
    }
}

/// One persisted reading.
///
/// Field order and column names match the history file header:
/// `Time,Sensor ID,Name,Value,Unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HistoryRecord {
    /// Local date-time, `YYYY-MM-DD HH:MM:SS`.
    #[serde(rename = "Time")]
    pub time: String,
    /// Sensor identifier.
    #[serde(rename = "Sensor ID")]
    pub sensor_id: String,
    /// Sensor display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Reading.
    #[serde(rename = "Value")]
    pub value: f64,
    /// Unit label.
    #[serde(rename = "Unit")]
    pub unit: String,
}

impl HistoryRecord {
    /// Column names in file order.
    pub const HEADER: [&'static str; 5] = ["Time", "Sensor ID", "Name", "Value", "Unit"];

    /// Build a record for `sensor` stamped with `at`.
    pub fn new<Tz>(at: &DateTime<Tz>, sensor: &SensorDefinition, value: f64) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            time: at.format(HISTORY_TIME_FORMAT).to_string(),
            sensor_id: sensor.id().to_owned(),
            name: sensor.name().to_owned(),
            value,
            unit: sensor.unit().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::Value;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 14, 3, 9)
            .single()
            .unwrap_or_default()
    }

    fn temp() -> Option<SensorDefinition> {
        SensorDefinition::new("temp", "Temperature", "°C", -10.0, 35.0).ok()
    }

    #[test]
    fn log_event_wire_shape() {
        let event = Event::from(LogEvent::new(&at(), LogLevel::Info, "Sensor 'x' ready."));
        let json: Value = serde_json::from_str(&event.to_wire().unwrap_or_default())
            .unwrap_or(Value::Null);
        assert_eq!(json["type"], "log");
        assert_eq!(json["time"], "14:03:09");
        assert_eq!(json["level"], "INFO");
        assert_eq!(json["message"], "Sensor 'x' ready.");
        assert_eq!(json.as_object().map(serde_json::Map::len), Some(4));
    }

    #[test]
    fn data_event_wire_shape() {
        let Some(sensor) = temp() else {
            return;
        };
        let event = Event::from(DataEvent::new(&at(), &sensor, 21.4));
        let json: Value = serde_json::from_str(&event.to_wire().unwrap_or_default())
            .unwrap_or(Value::Null);
        assert_eq!(json["type"], "data");
        assert_eq!(json["sensor_id"], "temp");
        assert_eq!(json["name"], "Temperature");
        assert_eq!(json["value"], 21.4);
        assert_eq!(json["unit"], "°C");
        assert_eq!(json["timestamp"], "14:03:09");
    }

    #[test]
    fn history_record_uses_full_date_and_column_names() {
        let Some(sensor) = temp() else {
            return;
        };
        let record = HistoryRecord::new(&at(), &sensor, -3.5);
        assert_eq!(record.time, "2024-05-17 14:03:09");
        let json: Value = serde_json::to_value(&record).unwrap_or(Value::Null);
        assert_eq!(json["Sensor ID"], "temp");
        assert_eq!(json["Value"], -3.5);
    }
}
