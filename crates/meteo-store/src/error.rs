//! Error conversion for the CSV history.
//!
//! The engine's [`HistoryError`] is defined upstream, so `csv` failures
//! are mapped here rather than through a `From` impl.

use meteo_core::HistoryError;

/// Map a [`csv::Error`] onto the engine's history error.
///
/// I/O failures keep their [`std::io::Error`]; everything else becomes
/// [`HistoryError::Format`].
pub fn from_csv(err: csv::Error) -> HistoryError {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => HistoryError::Io(io),
            other => HistoryError::Format(format!("{other:?}")),
        }
    } else {
        HistoryError::Format(err.to_string())
    }
}

/// Map a poisoned lock onto the engine's history error.
pub fn from_poison<T>(err: &std::sync::PoisonError<T>) -> HistoryError {
    HistoryError::Lock(err.to_string())
}
