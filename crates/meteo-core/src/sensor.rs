//! Periodic sensor generator.
//!
//! Each [`SensorWorker`] runs forever on its own task:
//!
//! 1. announce "ready" once,
//! 2. if running, draw a reading, append it to history, check thresholds
//!    and broadcast it,
//! 3. sleep for the *current* sampling interval, then repeat from 2.
//!
//! Pausing only suppresses step 2; the loop keeps its cadence so a resumed
//! sensor picks up on its next wake without any timer management.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Local;
use meteo_types::{DataEvent, Event, HistoryRecord, LogLevel, SensorDefinition, SensorSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use crate::station::StationContext;
use crate::threshold;

/// Bit pattern marking "no reading yet" (a NaN never produced by sampling).
const NO_VALUE: u64 = u64::MAX;

/// One simulated sensor and its runtime state.
#[derive(Debug)]
pub struct SensorWorker {
    definition: SensorDefinition,
    active: AtomicBool,
    last_value: AtomicU64,
    ctx: StationContext,
}

impl SensorWorker {
    /// Create a running worker for `definition`.
    pub const fn new(definition: SensorDefinition, ctx: StationContext) -> Self {
        Self {
            definition,
            active: AtomicBool::new(true),
            last_value: AtomicU64::new(NO_VALUE),
            ctx,
        }
    }

    /// The immutable sensor definition.
    pub const fn definition(&self) -> &SensorDefinition {
        &self.definition
    }

    /// Sensor identifier.
    pub fn id(&self) -> &str {
        self.definition.id()
    }

    /// Whether the worker is producing readings.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Most recent reading, if any cycle has produced one.
    pub fn last_value(&self) -> Option<f64> {
        let bits = self.last_value.load(Ordering::Acquire);
        (bits != NO_VALUE).then(|| f64::from_bits(bits))
    }

    /// Snapshot for the dashboard.
    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            id: self.definition.id().to_owned(),
            name: self.definition.name().to_owned(),
            unit: self.definition.unit().to_owned(),
            active: self.is_active(),
            last_value: self.last_value(),
        }
    }

    // -----------------------------------------------------------------------
    // Start / Stop
    // -----------------------------------------------------------------------

    /// Resume producing readings.
    ///
    /// Returns `true` and broadcasts a notice only on a real transition.
    pub async fn start(&self) -> bool {
        let changed = self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if changed {
            info!(sensor_id = %self.id(), "Sensor started");
            self.ctx
                .hub
                .log(
                    LogLevel::Info,
                    format!("Sensor '{}' started.", self.definition.name()),
                )
                .await;
        }
        changed
    }

    /// Pause producing readings.
    ///
    /// Returns `true` and broadcasts a notice only on a real transition.
    pub async fn stop(&self) -> bool {
        let changed = self
            .active
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if changed {
            info!(sensor_id = %self.id(), "Sensor stopped");
            self.ctx
                .hub
                .log(
                    LogLevel::Info,
                    format!("Sensor '{}' stopped.", self.definition.name()),
                )
                .await;
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Draw a reading uniformly from `[min, max]`, rounded to one decimal.
    ///
    /// Rounding can push a value past a bound that is not itself a multiple
    /// of 0.1, so the result is clamped back into range.
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        let (min, max) = (self.definition.min(), self.definition.max());
        let raw = rng.random_range(min..=max);
        ((raw * 10.0).round() / 10.0).clamp(min, max)
    }

    /// Run one generation step.
    ///
    /// Returns the produced value, or `None` while paused.
    pub async fn cycle(&self, rng: &mut (impl Rng + Send)) -> Option<f64> {
        if !self.is_active() {
            return None;
        }

        let value = self.sample(rng);
        self.last_value.store(value.to_bits(), Ordering::Release);
        let now = Local::now();

        self.record(HistoryRecord::new(&now, &self.definition, value))
            .await;

        let kind = threshold::evaluate(self.id(), value, &self.ctx.thresholds);
        if let Some(message) = threshold::alert_message(kind, self.definition.name(), value) {
            self.ctx.hub.log(LogLevel::Warning, message).await;
        }

        let event = Event::Data(DataEvent::new(&now, &self.definition, value));
        self.ctx.hub.broadcast(&event).await;
        Some(value)
    }

    /// Append to history on the blocking pool; failures are logged only.
    async fn record(&self, record: HistoryRecord) {
        let history = Arc::clone(&self.ctx.history);
        let sensor_id = record.sensor_id.clone();
        match tokio::task::spawn_blocking(move || history.append(&record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(sensor_id = %sensor_id, error = %e, "History append failed"),
            Err(e) => error!(sensor_id = %sensor_id, error = %e, "History append task failed"),
        }
    }

    // -----------------------------------------------------------------------
    // Scheduling loop
    // -----------------------------------------------------------------------

    /// Announce readiness, then cycle forever.
    pub async fn run(self: Arc<Self>) {
        self.ctx
            .hub
            .log(
                LogLevel::Info,
                format!("Sensor '{}' ready.", self.definition.name()),
            )
            .await;
        self.resume().await;
    }

    /// Cycle forever without the readiness notice. Used after a restart.
    pub async fn resume(self: Arc<Self>) {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        debug!(sensor_id = %self.id(), "Generator loop running");
        loop {
            self.cycle(&mut rng).await;
            let interval = self.ctx.sampling.interval();
            tokio::time::sleep(interval).await;
        }
    }
}
