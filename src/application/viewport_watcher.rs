// Viewport watcher - poll the widget's visible range and report real changes
use crate::application::chunk_scheduler::ChunkScheduler;
use crate::application::curve_renderer::CurveRenderer;
use crate::domain::viewport::Viewport;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

/// The widget does not reliably emit scroll/zoom events, so the visible range
/// is sampled on a fixed interval instead.
pub struct ViewportWatcher {
    renderer: Arc<dyn CurveRenderer>,
    tolerance: f64,
    last_seen: Option<Viewport>,
}

impl ViewportWatcher {
    pub fn new(renderer: Arc<dyn CurveRenderer>, tolerance: f64) -> Self {
        Self {
            renderer,
            tolerance,
            last_seen: None,
        }
    }

    /// Read the visible range once. Returns it only when it moved by more than
    /// the tolerance since the last reported viewport.
    pub fn poll(&mut self) -> Option<Viewport> {
        let viewport = self.renderer.visible_range()?;
        if !viewport.is_ready() {
            return None;
        }
        if let Some(last) = &self.last_seen {
            if !viewport.differs_from(last, self.tolerance) {
                return None;
            }
        }
        self.last_seen = Some(viewport);
        Some(viewport)
    }

    pub fn last_seen(&self) -> Option<Viewport> {
        self.last_seen
    }

    pub fn spawn(mut self, interval: Duration, scheduler: Arc<ChunkScheduler>) -> WatchHandle {
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = IntervalStream::new(timer);

            while ticks.next().await.is_some() {
                if let Some(viewport) = self.poll() {
                    tracing::debug!("Viewport changed to [{}, {}]", viewport.lo, viewport.hi);
                    scheduler.on_viewport_changed(viewport);
                }
            }
        });
        WatchHandle {
            handle: Some(handle),
        }
    }
}

/// Owns the polling task; cancelling or dropping it stops the poll.
#[derive(Debug)]
pub struct WatchHandle {
    handle: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chunk_loader::ChunkLoader;
    use crate::application::chunk_scheduler::SchedulerSettings;
    use crate::application::in_flight::InFlightRegistry;
    use crate::application::range_tracker::RangeTracker;
    use crate::application::series_store::SeriesStore;
    use crate::application::stream_catalog::StreamCatalog;
    use crate::application::testing::{FakeRepository, header};
    use crate::domain::curve::Curve;
    use crate::infrastructure::headless_renderer::HeadlessRenderer;

    #[test]
    fn test_not_constructed_and_not_ready_are_skipped() {
        let renderer = Arc::new(HeadlessRenderer::new());
        let mut watcher = ViewportWatcher::new(renderer.clone(), 2.0);

        assert_eq!(watcher.poll(), None);
        renderer.set_viewport(Viewport::new(0.0, 0.0));
        assert_eq!(watcher.poll(), None);
        assert_eq!(watcher.last_seen(), None);

        renderer.set_viewport(Viewport::new(100.0, 300.0));
        assert_eq!(watcher.poll(), Some(Viewport::new(100.0, 300.0)));
    }

    #[test]
    fn test_changes_within_tolerance_are_ignored() {
        let renderer = Arc::new(HeadlessRenderer::new());
        let mut watcher = ViewportWatcher::new(renderer.clone(), 2.0);

        renderer.set_viewport(Viewport::new(100.0, 300.0));
        assert!(watcher.poll().is_some());
        assert!(watcher.poll().is_none());

        renderer.set_viewport(Viewport::new(101.5, 301.0));
        assert!(watcher.poll().is_none());

        renderer.set_viewport(Viewport::new(110.0, 310.0));
        assert_eq!(watcher.poll(), Some(Viewport::new(110.0, 310.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_watcher_drives_scheduler_until_cancelled() {
        let repository = Arc::new(FakeRepository::new(10.0));
        let renderer = Arc::new(HeadlessRenderer::new());
        let tracker = Arc::new(RangeTracker::new(500.0));
        let store = Arc::new(SeriesStore::new(Arc::clone(&tracker)));
        let catalog = Arc::new(StreamCatalog::new());
        catalog.register(header("well", 0.0, 2000.0, false), vec![Curve::new("well", "GR")]);
        let loader = Arc::new(ChunkLoader::new(
            repository.clone(),
            Arc::clone(&catalog),
            Arc::clone(&store),
            renderer.clone(),
            InFlightRegistry::new(3),
            Duration::from_secs(5),
        ));
        let scheduler = Arc::new(ChunkScheduler::new(
            catalog,
            tracker,
            loader,
            SchedulerSettings::default(),
        ));

        let watcher = ViewportWatcher::new(renderer.clone(), 2.0);
        let mut handle = watcher.spawn(Duration::from_millis(300), scheduler);
        assert!(handle.is_active());

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(repository.calls().is_empty());

        renderer.set_viewport(Viewport::new(1000.0, 1100.0));
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(repository.calls(), vec![("well".to_string(), 750.0, 1250.0)]);

        handle.cancel();
        assert!(!handle.is_active());
        renderer.set_viewport(Viewport::new(1400.0, 1500.0));
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(repository.calls().len(), 1);
    }
}
