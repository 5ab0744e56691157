//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and shutdown.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: meteo_core::ConfigError,
    },

    /// The history file could not be opened.
    #[error("history error: {source}")]
    History {
        /// The underlying history error.
        #[from]
        source: meteo_core::HistoryError,
    },

    /// The station could not be assembled.
    #[error("station error: {source}")]
    Station {
        /// The underlying station error.
        #[from]
        source: meteo_core::StationError,
    },

    /// Observer state could not be built.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying observer error.
        #[from]
        source: meteo_observer::error::ObserverError,
    },

    /// Observer server failed to start.
    #[error("observer startup error: {source}")]
    Startup {
        /// The underlying startup error.
        #[from]
        source: meteo_observer::startup::StartupError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
