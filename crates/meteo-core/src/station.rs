//! Operator command surface and the supervised generator fleet.
//!
//! [`Station`] owns one [`SensorWorker`] per configured sensor and exposes
//! the runtime controls: change the sampling interval, start or stop one
//! sensor or all of them, and snapshot the fleet for the dashboard.
//!
//! # Supervision
//!
//! [`Station::spawn`] starts every generator inside one [`JoinSet`] owned
//! by a supervisor task. Generators never exit on their own; if one
//! panics, the supervisor logs the fault and restarts that generator after
//! an exponential backoff, without repeating its "ready" notice. Its
//! runtime state survives because it lives in the shared worker. Dropping or shutting down the
//! [`FleetHandle`] aborts the supervisor and, with it, every generator.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use meteo_types::{DefinitionError, LogLevel, SensorDefinition, StationSnapshot, ThresholdTable};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::StationConfig;
use crate::history::HistoryRecorder;
use crate::hub::BroadcastHub;
use crate::sampling::SamplingController;
use crate::sensor::SensorWorker;

/// Errors raised while assembling a station.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Two sensors share an identifier.
    #[error("duplicate sensor identifier: {0}")]
    DuplicateSensor(String),

    /// A sensor definition is invalid.
    #[error("invalid sensor definition: {0}")]
    Definition(#[from] DefinitionError),
}

/// Shared collaborators handed to every generator at construction.
#[derive(Debug, Clone)]
pub struct StationContext {
    /// Fan-out hub for log and data events.
    pub hub: Arc<BroadcastHub>,
    /// Process-wide sampling interval.
    pub sampling: Arc<SamplingController>,
    /// Durable reading log.
    pub history: Arc<dyn HistoryRecorder>,
    /// Alert bounds.
    pub thresholds: Arc<ThresholdTable>,
}

impl StationContext {
    /// Wire up a fresh hub and sampling controller.
    pub fn new(
        history: Arc<dyn HistoryRecorder>,
        thresholds: ThresholdTable,
        initial_interval_secs: f64,
    ) -> Self {
        let sampling = Arc::new(SamplingController::new(initial_interval_secs));
        Self {
            hub: Arc::new(BroadcastHub::new(Arc::clone(&sampling))),
            sampling,
            history,
            thresholds: Arc::new(thresholds),
        }
    }
}

/// The sensor fleet plus its operator controls.
#[derive(Debug)]
pub struct Station {
    ctx: StationContext,
    sensors: Vec<Arc<SensorWorker>>,
    by_id: BTreeMap<String, usize>,
}

impl Station {
    /// Build a station from validated definitions.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::DuplicateSensor`] if two definitions share
    /// an identifier.
    pub fn new(
        definitions: Vec<SensorDefinition>,
        thresholds: ThresholdTable,
        history: Arc<dyn HistoryRecorder>,
        initial_interval_secs: f64,
    ) -> Result<Self, StationError> {
        let ctx = StationContext::new(history, thresholds, initial_interval_secs);
        let mut sensors = Vec::with_capacity(definitions.len());
        let mut by_id = BTreeMap::new();
        for definition in definitions {
            let id = definition.id().to_owned();
            if by_id.contains_key(&id) {
                return Err(StationError::DuplicateSensor(id));
            }
            by_id.insert(id, sensors.len());
            sensors.push(Arc::new(SensorWorker::new(definition, ctx.clone())));
        }
        Ok(Self {
            ctx,
            sensors,
            by_id,
        })
    }

    /// Build a station from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StationError`] if a configured sensor is invalid or
    /// duplicated.
    pub fn from_config(
        config: &StationConfig,
        history: Arc<dyn HistoryRecorder>,
    ) -> Result<Self, StationError> {
        Self::new(
            config.sensor_definitions()?,
            config.thresholds.clone(),
            history,
            config.station.initial_interval_secs,
        )
    }

    /// The broadcast hub observers register with.
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.ctx.hub
    }

    /// The shared sampling controller.
    pub fn sampling(&self) -> &Arc<SamplingController> {
        &self.ctx.sampling
    }

    /// The history recorder readings are appended to.
    pub fn history(&self) -> &Arc<dyn HistoryRecorder> {
        &self.ctx.history
    }

    /// Look up a sensor worker by identifier.
    pub fn sensor(&self, id: &str) -> Option<&Arc<SensorWorker>> {
        self.by_id.get(id).and_then(|&idx| self.sensors.get(idx))
    }

    /// All sensor workers in fleet order.
    pub fn sensors(&self) -> &[Arc<SensorWorker>] {
        &self.sensors
    }

    // -----------------------------------------------------------------------
    // Operator commands
    // -----------------------------------------------------------------------

    /// Clamp and apply a new sampling interval, announce it, and return the
    /// effective value.
    pub async fn set_interval(&self, requested: f64) -> f64 {
        let effective = self.ctx.sampling.set_interval(requested);
        info!(requested, interval_secs = effective, "Sampling interval changed");
        self.ctx
            .hub
            .log(
                LogLevel::System,
                format!("Update interval changed to {effective:?} s"),
            )
            .await;
        effective
    }

    /// Start one sensor.
    ///
    /// Returns `None` for an unknown identifier (ignored), otherwise
    /// whether the sensor changed state.
    pub async fn start_sensor(&self, id: &str) -> Option<bool> {
        let Some(sensor) = self.sensor(id) else {
            debug!(sensor_id = id, "Start ignored for unknown sensor");
            return None;
        };
        Some(sensor.start().await)
    }

    /// Stop one sensor. See [`start_sensor`](Self::start_sensor).
    pub async fn stop_sensor(&self, id: &str) -> Option<bool> {
        let Some(sensor) = self.sensor(id) else {
            debug!(sensor_id = id, "Stop ignored for unknown sensor");
            return None;
        };
        Some(sensor.stop().await)
    }

    /// Start every sensor; returns how many changed state.
    pub async fn start_all(&self) -> usize {
        let mut changed = 0_usize;
        for sensor in &self.sensors {
            if sensor.start().await {
                changed = changed.saturating_add(1);
            }
        }
        changed
    }

    /// Stop every sensor; returns how many changed state.
    pub async fn stop_all(&self) -> usize {
        let mut changed = 0_usize;
        for sensor in &self.sensors {
            if sensor.stop().await {
                changed = changed.saturating_add(1);
            }
        }
        changed
    }

    /// Current interval and per-sensor state.
    pub fn snapshot(&self) -> StationSnapshot {
        StationSnapshot {
            interval_secs: self.ctx.sampling.interval_secs(),
            sensors: self.sensors.iter().map(|s| s.snapshot()).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Fleet lifecycle
    // -----------------------------------------------------------------------

    /// Spawn every generator under a supervisor task.
    pub fn spawn(self: &Arc<Self>) -> FleetHandle {
        let station = Arc::clone(self);
        let count = self.sensors.len();
        info!(sensors = count, "Starting sensor fleet");
        let handle = tokio::spawn(supervise(count, move |idx, launch| {
            let worker = station.sensors.get(idx).map(Arc::clone);
            async move {
                let Some(worker) = worker else {
                    return;
                };
                match launch {
                    Launch::Initial => worker.run().await,
                    Launch::Restart => worker.resume().await,
                }
            }
        }));
        FleetHandle { handle }
    }
}

/// Handle to the running fleet.
#[derive(Debug)]
pub struct FleetHandle {
    handle: JoinHandle<()>,
}

impl FleetHandle {
    /// Abort every generator and wait for the supervisor to finish.
    pub async fn shutdown(mut self) {
        self.handle.abort();
        match (&mut self.handle).await {
            Err(e) if e.is_panic() => error!(error = %e, "Fleet supervisor panicked"),
            _ => info!("Sensor fleet stopped"),
        }
    }

    /// Whether the supervisor is still running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for FleetHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// How a supervised task is being launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// First start.
    Initial,
    /// Restart after a panic.
    Restart,
}

/// Delay before the first restart of a panicked task.
pub const RESTART_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Upper bound on the restart delay. A task that stays up this long
/// before panicking again starts over from [`RESTART_BACKOFF_BASE`].
pub const RESTART_BACKOFF_MAX: Duration = Duration::from_secs(30);

/// Bookkeeping for one live supervised task.
#[derive(Debug, Clone, Copy)]
struct Slot {
    idx: usize,
    started: Instant,
    backoff: Duration,
}

/// Run `count` tasks built by `launch`, restarting any that panic.
///
/// Restarts are delayed with exponential backoff per task, doubling from
/// [`RESTART_BACKOFF_BASE`] up to [`RESTART_BACKOFF_MAX`]. Returns once
/// every task has exited without panicking.
pub async fn supervise<F, Fut>(count: usize, launch: F)
where
    F: Fn(usize, Launch) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    let mut slots = HashMap::with_capacity(count);
    let now = Instant::now();
    for idx in 0..count {
        let handle = tasks.spawn(launch(idx, Launch::Initial));
        slots.insert(
            handle.id(),
            Slot {
                idx,
                started: now,
                backoff: RESTART_BACKOFF_BASE,
            },
        );
    }

    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, ())) => {
                let idx = slots.remove(&id).map(|slot| slot.idx);
                warn!(task = ?idx, "Supervised task exited");
            }
            Err(e) => {
                let Some(slot) = slots.remove(&e.id()) else {
                    continue;
                };
                if !e.is_panic() {
                    debug!(task = slot.idx, "Supervised task cancelled");
                    continue;
                }

                let now = Instant::now();
                let delay = if now.saturating_duration_since(slot.started) >= RESTART_BACKOFF_MAX {
                    RESTART_BACKOFF_BASE
                } else {
                    slot.backoff
                };
                error!(
                    task = slot.idx,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "Supervised task panicked, restarting"
                );

                let restarted = launch(slot.idx, Launch::Restart);
                let handle = tasks.spawn(async move {
                    tokio::time::sleep(delay).await;
                    restarted.await;
                });
                slots.insert(
                    handle.id(),
                    Slot {
                        idx: slot.idx,
                        started: now.checked_add(delay).unwrap_or(now),
                        backoff: delay.saturating_mul(2).min(RESTART_BACKOFF_MAX),
                    },
                );
            }
        }
    }
}
