//! Fan-out of events to every connected observer.
//!
//! The hub keeps the observer set behind an async [`RwLock`]. A broadcast
//! serializes the event once, clones the current set of sinks, releases
//! the lock, and then offers the payload to each sink in turn. Delivery is
//! best-effort: a failing sink is skipped and stays registered, since only
//! the transport layer decides when a connection is gone.
//!
//! Sinks must not block. The stock sink is a bounded [`mpsc::Sender`]
//! drained by the connection task; a full queue counts as a failed
//! delivery for that observer only.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Local;
use meteo_types::{Event, LogEvent, LogLevel, ObserverId};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use crate::sampling::SamplingController;

/// Why a single delivery failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The observer's connection has gone away.
    #[error("observer closed")]
    Closed,

    /// The observer is not keeping up and its queue is full.
    #[error("observer queue full")]
    Full,
}

/// Destination for serialized events, one per observer connection.
pub trait ObserverSink: Send + Sync {
    /// Offer one serialized event without blocking.
    fn deliver(&self, payload: &str) -> Result<(), DeliveryError>;
}

impl ObserverSink for mpsc::Sender<String> {
    fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        self.try_send(payload.to_owned()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Registry of live observers and the fan-out entry point.
pub struct BroadcastHub {
    observers: RwLock<BTreeMap<ObserverId, Arc<dyn ObserverSink>>>,
    sampling: Arc<SamplingController>,
}

impl BroadcastHub {
    /// Create an empty hub. `sampling` is read for the welcome notice.
    pub fn new(sampling: Arc<SamplingController>) -> Self {
        Self {
            observers: RwLock::new(BTreeMap::new()),
            sampling,
        }
    }

    /// Add an observer and announce the current interval to everyone,
    /// the newcomer included.
    pub async fn register(&self, sink: Arc<dyn ObserverSink>) -> ObserverId {
        let id = ObserverId::new();
        let count = {
            let mut observers = self.observers.write().await;
            observers.insert(id, sink);
            observers.len()
        };
        debug!(observer_id = %id, observers = count, "Observer registered");

        let interval = self.sampling.interval_secs();
        self.log(
            LogLevel::System,
            format!("Client connected. Update interval: {interval:?}s"),
        )
        .await;
        id
    }

    /// Remove an observer. Removing an unknown observer is a no-op.
    ///
    /// Returns `true` if the observer was registered.
    pub async fn unregister(&self, id: ObserverId) -> bool {
        let removed = self.observers.write().await.remove(&id).is_some();
        if removed {
            debug!(observer_id = %id, "Observer unregistered");
        }
        removed
    }

    /// Number of registered observers.
    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    /// Deliver `event` to every registered observer.
    ///
    /// Returns the number of observers that accepted the event. Failures
    /// are swallowed per observer and never reach the caller.
    pub async fn broadcast(&self, event: &Event) -> usize {
        let payload = match event.to_wire() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize event");
                return 0;
            }
        };

        let targets: Vec<(ObserverId, Arc<dyn ObserverSink>)> = self
            .observers
            .read()
            .await
            .iter()
            .map(|(id, sink)| (*id, Arc::clone(sink)))
            .collect();

        let mut delivered = 0_usize;
        for (id, sink) in targets {
            match sink.deliver(&payload) {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err(e) => debug!(observer_id = %id, error = %e, "Delivery skipped"),
            }
        }
        delivered
    }

    /// Build a log event stamped now and broadcast it.
    pub async fn log(&self, level: LogLevel, message: impl Into<String>) -> usize {
        let event = LogEvent::new(&Local::now(), level, message);
        debug!(level = %event.level, message = %event.message, "Log event");
        self.broadcast(&Event::Log(event)).await
    }
}

impl core::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("sampling", &self.sampling)
            .finish_non_exhaustive()
    }
}
