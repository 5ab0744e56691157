//! Threshold evaluation for sensor readings.
//!
//! Evaluation is a pure function of `(sensor id, value, table)`. The
//! maximum bound is always checked first, so `AboveMax` wins over
//! `BelowMin` when an entry is misconfigured with `min > max`.

use meteo_types::{AlertKind, ThresholdEntry, ThresholdTable};

/// Classify `value` for `sensor_id` against `table`.
///
/// Sensors without an entry classify as [`AlertKind::None`].
pub fn evaluate(sensor_id: &str, value: f64, table: &ThresholdTable) -> AlertKind {
    table
        .get(sensor_id)
        .map_or(AlertKind::None, |entry| classify(entry, value))
}

/// Classify `value` against a single entry. Bounds are exclusive.
pub fn classify(entry: &ThresholdEntry, value: f64) -> AlertKind {
    if entry.max.is_some_and(|max| value > max) {
        AlertKind::AboveMax
    } else if entry.min.is_some_and(|min| value < min) {
        AlertKind::BelowMin
    } else {
        AlertKind::None
    }
}

/// Operator-facing warning text for an alert, or `None` when there is none.
pub fn alert_message(kind: AlertKind, sensor_name: &str, value: f64) -> Option<String> {
    match kind {
        AlertKind::AboveMax => Some(format!("HIGH LIMIT: {sensor_name} {value:?}")),
        AlertKind::BelowMin => Some(format!("LOW LIMIT: {sensor_name} {value:?}")),
        AlertKind::None => None,
    }
}
