// Chunk scheduler - decide which (stream, range) fetches a viewport needs
use crate::application::chunk_loader::{ChunkLoader, PendingFetch};
use crate::application::in_flight::InFlightRegistry;
use crate::application::range_tracker::{ChunkSizes, RangeTracker};
use crate::application::stream_catalog::{StreamCatalog, StreamEntry};
use crate::domain::range::{ChunkRange, ChunkRequest, RequestKind};
use crate::domain::viewport::{ScrollDirection, Viewport};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub chunk_sizes: ChunkSizes,
    /// Cap on concurrent scroll fetches
    pub max_concurrent_fetches: usize,
    /// Cap while scrolling toward lower indices (historical backfill)
    pub backfill_max_concurrent: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            chunk_sizes: ChunkSizes::default(),
            max_concurrent_fetches: 2,
            backfill_max_concurrent: 4,
        }
    }
}

pub struct ChunkScheduler {
    catalog: Arc<StreamCatalog>,
    tracker: Arc<RangeTracker>,
    registry: Arc<InFlightRegistry>,
    loader: Arc<ChunkLoader>,
    settings: SchedulerSettings,
    last_viewport: Mutex<Option<Viewport>>,
}

impl ChunkScheduler {
    pub fn new(
        catalog: Arc<StreamCatalog>,
        tracker: Arc<RangeTracker>,
        loader: Arc<ChunkLoader>,
        settings: SchedulerSettings,
    ) -> Self {
        let registry = Arc::clone(loader.registry());
        Self {
            catalog,
            tracker,
            registry,
            loader,
            settings,
            last_viewport: Mutex::new(None),
        }
    }

    /// Dispatch fetches for every stream whose loaded window does not cover the
    /// viewport plus half a chunk on each side.
    ///
    /// A no-op while the concurrency cap is reached; the next viewport change
    /// picks up whatever is still missing.
    pub fn on_viewport_changed(&self, viewport: Viewport) -> Vec<PendingFetch> {
        let direction = {
            let mut last = self
                .last_viewport
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let direction = viewport.direction_from(last.as_ref());
            *last = Some(viewport);
            direction
        };
        let cap = match direction {
            ScrollDirection::Up => self.settings.backfill_max_concurrent,
            _ => self.settings.max_concurrent_fetches,
        };

        if self.registry.active(RequestKind::Scroll) >= cap {
            tracing::debug!("At fetch cap ({}), skipping viewport {:?}", cap, viewport);
            return Vec::new();
        }

        let mut pending = Vec::new();
        'streams: for entry in self.catalog.streams() {
            for range in self.plan_stream(&entry, viewport, direction) {
                if self.registry.active(RequestKind::Scroll) >= cap {
                    break 'streams;
                }
                let request = ChunkRequest::scroll(entry.stream_id(), range);
                let Some(guard) = self.registry.try_acquire(request.key.clone()) else {
                    tracing::debug!("{} already in flight", request.key);
                    continue;
                };
                pending.push(self.loader.dispatch(request, guard));
            }
        }
        pending
    }

    /// Missing ranges of one stream. All curves of a stream load together, so the
    /// first curve holding data stands for the whole stream.
    pub fn plan_stream(
        &self,
        entry: &StreamEntry,
        viewport: Viewport,
        direction: ScrollDirection,
    ) -> Vec<ChunkRange> {
        let domain = entry.domain();
        let representative = entry
            .curves
            .iter()
            .find(|c| self.tracker.loaded(&c.id).is_some());

        let Some(curve) = representative else {
            return entry
                .curves
                .first()
                .and_then(|c| self.tracker.initial(&c.id, viewport.lo, domain))
                .into_iter()
                .collect();
        };

        let buffer = self.tracker.chunk_size_for(&curve.id) / 2.0;
        let need_min = (viewport.lo - buffer).max(domain.min);
        let need_max = (viewport.hi + buffer).min(domain.max);

        let below = self.tracker.missing_below(&curve.id, need_min, domain);
        let above = self.tracker.missing_above(&curve.id, need_max, domain);
        let ordered = match direction {
            ScrollDirection::Up => [below, above],
            _ => [above, below],
        };
        ordered.into_iter().flatten().collect()
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Forget the previous viewport so the next call has no scroll direction.
    pub fn reset(&self) {
        *self
            .last_viewport
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
