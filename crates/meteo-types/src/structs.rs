//! Core data structs: sensor definitions, thresholds and snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::DefinitionError;

// ---------------------------------------------------------------------------
// Sensor Definition
// ---------------------------------------------------------------------------

/// Immutable description of one simulated sensor.
///
/// The bounds are validated at construction: both are finite, `min <= max`,
/// and the width `max - min` is at most half of `f64::MAX`, so a generator
/// built from a definition can always draw a value.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SensorDefinition {
    id: String,
    name: String,
    unit: String,
    min: f64,
    max: f64,
}

impl SensorDefinition {
    /// Create a validated sensor definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the id is empty, a bound is not
    /// finite, `min > max`, or the range is too wide to sample.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Result<Self, DefinitionError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DefinitionError::EmptyId);
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(DefinitionError::NonFiniteBound { id });
        }
        if min > max {
            return Err(DefinitionError::InvertedBounds { id, min, max });
        }
        // Uniform sampling scales the width up slightly; keep it well clear of overflow.
        if !((max - min) * 2.0).is_finite() {
            return Err(DefinitionError::RangeTooWide { id, min, max });
        }
        Ok(Self {
            id,
            name: name.into(),
            unit: unit.into(),
            min,
            max,
        })
    }

    /// Unique sensor identifier (e.g. `temp`).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit label shown next to readings.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Lowest generatable value.
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Highest generatable value.
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Alert bounds for one sensor. A missing bound means no limit on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ThresholdEntry {
    /// Readings strictly above this value raise a high-limit warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max: Option<f64>,
    /// Readings strictly below this value raise a low-limit warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub min: Option<f64>,
}

impl ThresholdEntry {
    /// Entry with only an upper bound.
    pub const fn upper(max: f64) -> Self {
        Self {
            max: Some(max),
            min: None,
        }
    }

    /// Entry with both bounds.
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            max: Some(max),
            min: Some(min),
        }
    }
}

/// Static mapping from sensor identifier to its alert bounds.
///
/// Entries whose identifier matches no sensor are harmless; sensors with
/// no entry never alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    entries: BTreeMap<String, ThresholdEntry>,
}

impl ThresholdTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace the entry for `sensor_id`, returning the table for chaining.
    #[must_use]
    pub fn with(mut self, sensor_id: impl Into<String>, entry: ThresholdEntry) -> Self {
        self.entries.insert(sensor_id.into(), entry);
        self
    }

    /// Look up the entry for `sensor_id`.
    pub fn get(&self, sensor_id: &str) -> Option<&ThresholdEntry> {
        self.entries.get(sensor_id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Point-in-time view of one sensor used for the initial dashboard render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SensorSnapshot {
    /// Sensor identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit label.
    pub unit: String,
    /// Whether the generator is currently running.
    pub active: bool,
    /// Most recent reading, if at least one cycle has produced one.
    pub last_value: Option<f64>,
}

/// Point-in-time view of the whole station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StationSnapshot {
    /// Current sampling interval in seconds.
    pub interval_secs: f64,
    /// Sensors in fleet order.
    pub sensors: Vec<SensorSnapshot>,
}

impl StationSnapshot {
    /// Sensors keyed by identifier.
    pub fn sensor_map(&self) -> BTreeMap<&str, &SensorSnapshot> {
        self.sensors.iter().map(|s| (s.id.as_str(), s)).collect()
    }
}
