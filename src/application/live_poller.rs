// Live poller - pull data past the loaded maximum of growing logs
use crate::application::chunk_loader::{ChunkLoader, PendingFetch};
use crate::application::in_flight::InFlightRegistry;
use crate::application::range_tracker::RangeTracker;
use crate::application::stream_catalog::{StreamCatalog, StreamEntry};
use crate::domain::range::{ChunkRange, ChunkRequest};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct LivePoller {
    catalog: Arc<StreamCatalog>,
    tracker: Arc<RangeTracker>,
    registry: Arc<InFlightRegistry>,
    loader: Arc<ChunkLoader>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl LivePoller {
    pub fn new(catalog: Arc<StreamCatalog>, tracker: Arc<RangeTracker>, loader: Arc<ChunkLoader>) -> Self {
        let registry = Arc::clone(loader.registry());
        Self {
            catalog,
            tracker,
            registry,
            loader,
            timer: Mutex::new(None),
        }
    }

    /// One poll round over every growing stream that already holds data.
    pub fn tick(&self) -> Vec<PendingFetch> {
        let mut pending = Vec::new();
        for entry in self.catalog.streams() {
            if !entry.header.growing {
                continue;
            }
            let Some(range) = self.plan_stream(&entry) else {
                continue;
            };
            let request = ChunkRequest::live(entry.stream_id(), range);
            let Some(guard) = self.registry.try_acquire(request.key.clone()) else {
                tracing::debug!("{} already in flight", request.key);
                continue;
            };
            pending.push(self.loader.dispatch(request, guard));
        }
        pending
    }

    /// `[max + 1, max + 1 + chunk)` past the highest index loaded by any curve.
    pub fn plan_stream(&self, entry: &StreamEntry) -> Option<ChunkRange> {
        let (curve_id, current_max) = entry
            .curves
            .iter()
            .filter_map(|c| self.tracker.loaded(&c.id).map(|r| (c.id.as_str(), r.max)))
            .reduce(|a, b| if b.1 > a.1 { b } else { a })?;
        let start = current_max + 1.0;
        Some(ChunkRange::new(start, start + self.tracker.chunk_size_for(curve_id)))
    }

    /// Start ticking every `interval`, replacing any running timer.
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.take() {
            previous.abort();
        }

        let poller = Arc::downgrade(self);
        *timer = Some(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; live data starts one interval in
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let Some(poller) = poller.upgrade() else {
                    break;
                };
                let dispatched = poller.tick();
                if !dispatched.is_empty() {
                    tracing::debug!("Live poll dispatched {} fetches", dispatched.len());
                }
            }
        }));
        tracing::info!("Live polling started every {:?}", interval);
    }

    pub fn stop(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
            tracing::info!("Live polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for LivePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
