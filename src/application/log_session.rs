// Log session - wires store, scheduler, watcher and poller for one rendering session
use crate::application::chunk_loader::ChunkLoader;
use crate::application::chunk_scheduler::{ChunkScheduler, SchedulerSettings};
use crate::application::curve_renderer::CurveRenderer;
use crate::application::in_flight::{FetchHealth, InFlightRegistry};
use crate::application::live_poller::LivePoller;
use crate::application::log_repository::LogRepository;
use crate::application::range_tracker::RangeTracker;
use crate::application::series_store::SeriesStore;
use crate::application::stream_catalog::StreamCatalog;
use crate::application::viewport_watcher::{ViewportWatcher, WatchHandle};
use crate::domain::curve::Curve;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub scheduler: SchedulerSettings,
    pub fetch_timeout: Duration,
    pub failure_threshold: u32,
    pub viewport_poll_interval: Duration,
    pub viewport_tolerance: f64,
    pub live_poll_interval: Duration,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            scheduler: SchedulerSettings::default(),
            fetch_timeout: Duration::from_secs(10),
            failure_threshold: 3,
            viewport_poll_interval: Duration::from_millis(300),
            viewport_tolerance: 2.0,
            live_poll_interval: Duration::from_secs(5),
        }
    }
}

/// Requested stream and the curves to draw from it.
#[derive(Debug, Clone)]
pub struct StreamSetup {
    pub stream_id: String,
    pub curves: Vec<Curve>,
    /// Overrides the chunk width chosen by index kind
    pub chunk_size: Option<f64>,
}

pub struct LogSession {
    settings: LoaderSettings,
    repository: Arc<dyn LogRepository>,
    renderer: Arc<dyn CurveRenderer>,
    catalog: Arc<StreamCatalog>,
    store: Arc<SeriesStore>,
    registry: Arc<InFlightRegistry>,
    loader: Arc<ChunkLoader>,
    scheduler: Arc<ChunkScheduler>,
    poller: Arc<LivePoller>,
    watcher: Mutex<Option<WatchHandle>>,
}

impl LogSession {
    pub fn new(
        settings: LoaderSettings,
        repository: Arc<dyn LogRepository>,
        renderer: Arc<dyn CurveRenderer>,
    ) -> Self {
        let tracker = Arc::new(RangeTracker::new(settings.scheduler.chunk_sizes.depth));
        let store = Arc::new(SeriesStore::new(Arc::clone(&tracker)));
        let catalog = Arc::new(StreamCatalog::new());
        let registry = InFlightRegistry::new(settings.failure_threshold);
        let loader = Arc::new(ChunkLoader::new(
            Arc::clone(&repository),
            Arc::clone(&catalog),
            Arc::clone(&store),
            Arc::clone(&renderer),
            Arc::clone(&registry),
            settings.fetch_timeout,
        ));
        let scheduler = Arc::new(ChunkScheduler::new(
            Arc::clone(&catalog),
            Arc::clone(&tracker),
            Arc::clone(&loader),
            settings.scheduler.clone(),
        ));
        let poller = Arc::new(LivePoller::new(
            Arc::clone(&catalog),
            tracker,
            Arc::clone(&loader),
        ));

        Self {
            settings,
            repository,
            renderer,
            catalog,
            store,
            registry,
            loader,
            scheduler,
            poller,
            watcher: Mutex::new(None),
        }
    }

    /// Fetch every stream header concurrently and register the streams that
    /// answered. Curves naming a mnemonic the header does not list are dropped.
    pub async fn open(&self, setups: Vec<StreamSetup>) -> anyhow::Result<usize> {
        let requested = setups.len();
        let headers = futures::future::join_all(
            setups
                .iter()
                .map(|setup| self.repository.fetch_header(&setup.stream_id)),
        )
        .await;

        let mut registered = 0;
        for (setup, header) in setups.into_iter().zip(headers) {
            let header = match header {
                Ok(header) => header,
                Err(e) => {
                    tracing::warn!("Skipping stream {}: header unavailable: {:#}", setup.stream_id, e);
                    continue;
                }
            };

            let (curves, unknown): (Vec<Curve>, Vec<Curve>) = setup
                .curves
                .into_iter()
                .partition(|c| header.has_mnemonic(&c.mnemonic));
            for curve in &unknown {
                tracing::warn!(
                    "Stream {} has no mnemonic {}, dropping curve {}",
                    header.stream_id,
                    curve.mnemonic,
                    curve.id
                );
            }
            if curves.is_empty() {
                continue;
            }

            let chunk_size = setup
                .chunk_size
                .unwrap_or_else(|| self.settings.scheduler.chunk_sizes.for_kind(header.index_kind));
            for curve in &curves {
                self.store.tracker().set_chunk_size(&curve.id, chunk_size);
            }

            tracing::info!(
                "Registered stream {} ({:?}, [{}, {}] {}, chunk {}, {} curves{})",
                header.stream_id,
                header.index_kind,
                header.start_index,
                header.end_index,
                header.unit,
                chunk_size,
                curves.len(),
                if header.growing { ", growing" } else { "" }
            );
            self.catalog.register(header, curves);
            registered += 1;
        }

        if registered == 0 && requested > 0 {
            anyhow::bail!("none of the {} requested streams could be opened", requested);
        }
        Ok(registered)
    }

    /// Begin watching the viewport, and live polling when any stream is growing.
    pub fn start(&self) {
        let watcher = ViewportWatcher::new(Arc::clone(&self.renderer), self.settings.viewport_tolerance);
        let handle = watcher.spawn(self.settings.viewport_poll_interval, Arc::clone(&self.scheduler));
        let previous = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        drop(previous);

        if self.catalog.any_growing() {
            self.poller.start(self.settings.live_poll_interval);
        }
    }

    pub fn set_curve_visibility(&self, curve_id: &str, visible: bool) -> bool {
        match self.catalog.set_visibility(curve_id, visible) {
            Some(curve) => {
                if curve.visible {
                    self.loader.push(&curve.id);
                }
                true
            }
            None => false,
        }
    }

    /// Scene rebuild: drop all loaded data. The scheduler forgets the last
    /// viewport so the next poll reloads around whatever is visible.
    pub fn rebuild(&self) {
        self.store.clear();
        self.registry.reset_failures();
        self.scheduler.reset();
        if let Some(handle) = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            handle.cancel();
        }
        self.start();
    }

    pub fn status(&self) -> FetchHealth {
        self.registry.health()
    }

    pub fn store(&self) -> &Arc<SeriesStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<StreamCatalog> {
        &self.catalog
    }

    pub fn scheduler(&self) -> &Arc<ChunkScheduler> {
        &self.scheduler
    }

    pub fn poller(&self) -> &Arc<LivePoller> {
        &self.poller
    }

    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(WatchHandle::is_active)
    }

    /// Cancel the viewport poll and the live timer. In-flight fetches finish on
    /// their own and release their markers.
    pub fn shutdown(&self) {
        if let Some(mut handle) = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.cancel();
        }
        self.poller.stop();
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeRepository, header};
    use crate::domain::log_stream::IndexKind;
    use crate::domain::range::IndexRange;
    use crate::domain::viewport::Viewport;
    use crate::infrastructure::headless_renderer::HeadlessRenderer;

    fn setup(stream_id: &str, mnemonics: &[&str]) -> StreamSetup {
        StreamSetup {
            stream_id: stream_id.to_string(),
            curves: mnemonics.iter().map(|m| Curve::new(stream_id, m)).collect(),
            chunk_size: None,
        }
    }

    fn session(repository: FakeRepository) -> (LogSession, Arc<HeadlessRenderer>) {
        let renderer = Arc::new(HeadlessRenderer::new());
        let session = LogSession::new(LoaderSettings::default(), Arc::new(repository), renderer.clone());
        (session, renderer)
    }

    #[tokio::test]
    async fn test_open_registers_known_streams_and_curves() {
        let repository = FakeRepository::new(10.0).with_header(header("well", 0.0, 2000.0, false));
        let (session, _) = session(repository);

        let opened = session
            .open(vec![setup("well", &["GR", "RHOB"]), setup("ghost", &["GR"])])
            .await
            .unwrap();

        assert_eq!(opened, 1);
        let entry = session.catalog().stream("well").unwrap();
        let ids: Vec<&str> = entry.curves.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["well:GR"]);
    }

    #[tokio::test]
    async fn test_open_fails_when_nothing_opens() {
        let (session, _) = session(FakeRepository::new(10.0));
        assert!(session.open(vec![setup("ghost", &["GR"])]).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_loads_viewport_and_polls_growing_log() {
        let repository = FakeRepository::new(10.0).with_header(header("well", 0.0, 2000.0, true));
        let (session, renderer) = session(repository);
        session.open(vec![setup("well", &["GR", "ROP"])]).await.unwrap();

        renderer.set_viewport(Viewport::new(1000.0, 1100.0));
        session.start();
        assert!(session.is_watching());
        assert!(session.poller().is_running());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.store().extent("well:GR"), Some(IndexRange::new(750.0, 1250.0)));
        assert!(renderer.values("well:ROP").is_some());

        tokio::time::sleep(Duration::from_secs(5)).await;
        let extent = session.store().extent("well:GR").unwrap();
        assert!(extent.max > 1250.0);
        assert!(session.status().is_healthy());

        session.shutdown();
        assert!(!session.is_watching());
        assert!(!session.poller().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_width_follows_index_kind() {
        let mut clock = header("clock", 0.0, 86_400_000.0, false);
        clock.index_kind = IndexKind::Time;
        let repository = FakeRepository::new(1000.0)
            .with_header(clock)
            .with_header(header("well", 0.0, 2000.0, false));
        let (session, renderer) = session(repository);
        let mut well = setup("well", &["GR"]);
        well.chunk_size = Some(100.0);
        session.open(vec![setup("clock", &["GR"]), well]).await.unwrap();

        let tracker = session.store().tracker();
        assert_eq!(tracker.chunk_size_for("clock:GR"), 3_600_000.0);
        assert_eq!(tracker.chunk_size_for("well:GR"), 100.0);

        renderer.set_viewport(Viewport::new(7_200_000.0, 7_260_000.0));
        session.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(
            session.store().extent("clock:GR"),
            Some(IndexRange::new(5_400_000.0, 9_000_000.0))
        );
        assert_eq!(session.store().series("clock:GR").len(), 3601);
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_curve_is_not_pushed_until_shown() {
        let repository = FakeRepository::new(10.0).with_header(header("well", 0.0, 2000.0, false));
        let (session, renderer) = session(repository);
        session.open(vec![setup("well", &["GR", "ROP"])]).await.unwrap();
        assert!(session.set_curve_visibility("well:ROP", false));
        assert!(!session.set_curve_visibility("well:CALI", false));

        renderer.set_viewport(Viewport::new(1000.0, 1100.0));
        session.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(renderer.values("well:ROP").is_none());
        assert!(session.store().extent("well:ROP").is_some());

        session.set_curve_visibility("well:ROP", true);
        let (indices, _) = renderer.values("well:ROP").unwrap();
        assert_eq!(indices.len(), 51);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuild_reloads_visible_window() {
        let repository = FakeRepository::new(10.0).with_header(header("well", 0.0, 2000.0, false));
        let (session, renderer) = session(repository);
        session.open(vec![setup("well", &["GR"])]).await.unwrap();

        renderer.set_viewport(Viewport::new(1000.0, 1100.0));
        session.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(session.store().extent("well:GR").is_some());

        session.rebuild();
        assert!(session.store().extent("well:GR").is_none());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.store().extent("well:GR"), Some(IndexRange::new(750.0, 1250.0)));
    }
}
