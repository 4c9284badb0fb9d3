// Chunk loader - fetch one chunk and merge it into every curve of its stream
use crate::application::curve_renderer::CurveRenderer;
use crate::application::in_flight::{InFlightGuard, InFlightRegistry};
use crate::application::log_repository::LogRepository;
use crate::application::series_store::SeriesStore;
use crate::application::stream_catalog::StreamCatalog;
use crate::domain::range::{ChunkRequest, RequestKind};
use crate::domain::rows::RawRows;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch of {key} timed out after {timeout:?}")]
    TimedOut { key: String, timeout: Duration },
    #[error("fetch of {key} failed: {message}")]
    Fetch { key: String, message: String },
}

#[derive(Debug)]
pub enum FetchOutcome {
    Merged { curves: usize, points: usize },
    /// Fetch succeeded but nothing usable came back; the range stays missing
    NoData,
    Failed(LoadError),
}

/// A dispatched fetch. Dropping the handle detaches the task.
#[derive(Debug)]
pub struct PendingFetch {
    pub request: ChunkRequest,
    pub handle: JoinHandle<FetchOutcome>,
}

/// Merge path shared by scroll loading and live polling.
pub struct ChunkLoader {
    repository: Arc<dyn LogRepository>,
    catalog: Arc<StreamCatalog>,
    store: Arc<SeriesStore>,
    renderer: Arc<dyn CurveRenderer>,
    registry: Arc<InFlightRegistry>,
    fetch_timeout: Duration,
}

impl ChunkLoader {
    pub fn new(
        repository: Arc<dyn LogRepository>,
        catalog: Arc<StreamCatalog>,
        store: Arc<SeriesStore>,
        renderer: Arc<dyn CurveRenderer>,
        registry: Arc<InFlightRegistry>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            catalog,
            store,
            renderer,
            registry,
            fetch_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<InFlightRegistry> {
        &self.registry
    }

    /// Spawn the fetch for an acquired key. The guard moves into the task and is
    /// dropped when it finishes, whatever the outcome.
    pub fn dispatch(self: &Arc<Self>, request: ChunkRequest, guard: InFlightGuard) -> PendingFetch {
        let loader = Arc::clone(self);
        let task_request = request.clone();
        let handle = tokio::spawn(async move { loader.load(task_request, guard).await });
        PendingFetch { request, handle }
    }

    pub async fn load(&self, request: ChunkRequest, guard: InFlightGuard) -> FetchOutcome {
        tracing::debug!("Fetching {} for stream {}", request.range, request.stream_id);

        let fetch = self.repository.fetch_range(
            &request.stream_id,
            request.range.start,
            request.range.end,
        );
        let outcome = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Err(_) => self.fail(
                &request,
                LoadError::TimedOut {
                    key: request.key.to_string(),
                    timeout: self.fetch_timeout,
                },
            ),
            Ok(Err(e)) => self.fail(
                &request,
                LoadError::Fetch {
                    key: request.key.to_string(),
                    message: format!("{:#}", e),
                },
            ),
            Ok(Ok(rows)) => {
                let outcome = self.apply(&request, &rows);
                // an empty reply neither breaks nor extends a failure streak
                if matches!(outcome, FetchOutcome::Merged { .. }) {
                    self.registry.record_success(&request.key);
                }
                outcome
            }
        };

        drop(guard);
        outcome
    }

    fn fail(&self, request: &ChunkRequest, error: LoadError) -> FetchOutcome {
        let attempts = self.registry.record_failure(&request.key);
        tracing::warn!("{} (consecutive failures: {})", error, attempts);
        FetchOutcome::Failed(error)
    }

    /// Merge fetched rows into every curve of the request's stream.
    ///
    /// Rows outside the requested range are clipped. A curve whose column is
    /// missing is skipped without affecting the others. When a scroll chunk adds
    /// nothing past the stream's loaded edges, the stream is sampled more coarsely
    /// than one chunk and its chunk width is doubled.
    pub fn apply(&self, request: &ChunkRequest, rows: &RawRows) -> FetchOutcome {
        if rows.is_empty() {
            tracing::debug!("No data for {}", request.key);
            return FetchOutcome::NoData;
        }

        let Some(entry) = self.catalog.stream(&request.stream_id) else {
            tracing::warn!("Dropping chunk {} for unregistered stream", request.key);
            return FetchOutcome::NoData;
        };
        let header = &entry.header;

        let mut curves = 0;
        let mut points = 0;
        let mut stream_max: Option<f64> = None;
        let mut advanced = false;

        for curve in &entry.curves {
            let mut samples = match rows.curve_points(
                &header.index_mnemonic,
                &curve.mnemonic,
                header.index_kind,
                header.null_value,
            ) {
                Ok(samples) => samples,
                Err(e) => {
                    tracing::debug!("Skipping curve {} in {}: {}", curve.id, request.key, e);
                    continue;
                }
            };
            samples.retain(|p| request.range.contains(p.index));
            if samples.is_empty() {
                continue;
            }

            curves += 1;
            points += samples.len();
            let before = self.store.extent(&curve.id);
            if let Some(extent) = self.store.merge_chunk(&curve.id, samples) {
                stream_max = Some(stream_max.map_or(extent.max, |m| m.max(extent.max)));
                advanced |= before.is_none_or(|b| extent.min < b.min || extent.max > b.max);
            }
            if curve.visible {
                self.push(&curve.id);
            }
        }

        if curves == 0 {
            tracing::debug!("Chunk {} held no usable samples", request.key);
            return FetchOutcome::NoData;
        }
        if let Some(max) = stream_max {
            self.catalog.extend_domain(&request.stream_id, max);
        }
        if !advanced && request.key.kind() == RequestKind::Scroll {
            let tracker = self.store.tracker();
            let limit = entry.domain().span();
            let mut widened = tracker.chunk_size();
            for curve in &entry.curves {
                widened = tracker.widen(&curve.id, limit);
            }
            tracing::info!(
                "Chunk {} added nothing past the loaded edges of {}, chunk width now {}",
                request.key,
                request.stream_id,
                widened
            );
        }

        tracing::debug!(
            "Merged {} samples across {} curves from {}",
            points,
            curves,
            request.key
        );
        FetchOutcome::Merged { curves, points }
    }

    /// Hand a curve's full series to the renderer.
    pub fn push(&self, curve_id: &str) {
        let series = self.store.series(curve_id);
        self.renderer
            .set_values(curve_id, &series.indices(), &series.values());
    }
}
