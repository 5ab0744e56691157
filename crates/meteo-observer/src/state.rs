//! Shared application state for the Observer server.
//!
//! [`AppState`] holds the running [`Station`] (command surface, hub and
//! history), the history settings the endpoints need, and the compiled
//! dashboard template.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use meteo_core::Station;
use minijinja::Environment;

use crate::error::ObserverError;

/// Name the dashboard template is registered under.
pub const INDEX_TEMPLATE: &str = "index.html";

/// Capacity of each observer's outbound queue.
///
/// An observer that falls this many events behind misses new events
/// until it catches up.
pub const OBSERVER_QUEUE_CAPACITY: usize = 256;

/// Default number of records served by `GET /history`.
const DEFAULT_HISTORY_TAIL: usize = 50;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// The telemetry station.
    pub station: Arc<Station>,
    /// History file served by `GET /download-log`, if file-backed.
    history_file: Option<PathBuf>,
    /// Number of records served by `GET /history`.
    history_tail: usize,
    /// Compiled templates.
    templates: Environment<'static>,
}

impl AppState {
    /// Create application state for `station`.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Template`] if the bundled dashboard
    /// template does not compile.
    pub fn new(station: Arc<Station>) -> Result<Self, ObserverError> {
        let mut templates = Environment::new();
        templates.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        Ok(Self {
            station,
            history_file: None,
            history_tail: DEFAULT_HISTORY_TAIL,
            templates,
        })
    }

    /// Expose `path` for download.
    #[must_use]
    pub fn with_history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_file = Some(path.into());
        self
    }

    /// Set how many records `GET /history` returns (at least one).
    #[must_use]
    pub fn with_history_tail(mut self, tail: usize) -> Self {
        self.history_tail = tail.max(1);
        self
    }

    /// History file available for download.
    pub fn history_file(&self) -> Option<&Path> {
        self.history_file.as_deref()
    }

    /// Number of records `GET /history` returns.
    pub const fn history_tail(&self) -> usize {
        self.history_tail
    }

    /// Compiled templates.
    pub const fn templates(&self) -> &Environment<'static> {
        &self.templates
    }
}

impl core::fmt::Debug for AppState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppState")
            .field("station", &self.station)
            .field("history_file", &self.history_file)
            .field("history_tail", &self.history_tail)
            .finish_non_exhaustive()
    }
}
