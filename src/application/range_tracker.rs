// Loaded-range bookkeeping and edge-anchored gap detection
use crate::domain::log_stream::IndexKind;
use crate::domain::range::{ChunkRange, IndexRange};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Chunk width per index kind: depth logs in metres or feet, time logs in epoch ms.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChunkSizes {
    pub depth: f64,
    pub time: f64,
}

impl Default for ChunkSizes {
    fn default() -> Self {
        Self {
            depth: 500.0,
            time: 3_600_000.0,
        }
    }
}

impl ChunkSizes {
    pub fn for_kind(&self, kind: IndexKind) -> f64 {
        match kind {
            IndexKind::Depth => self.depth,
            IndexKind::Time => self.time,
        }
    }
}

/// Per-curve record of the contiguous span currently held in the series store.
///
/// Ranges are written only by [`SeriesStore::merge_chunk`](super::series_store::SeriesStore::merge_chunk).
/// Gap requests are always anchored to the loaded edges and at most one chunk
/// wide, so repeated scrolls converge on the same keys. Each curve may carry
/// its own chunk width; curves without one use the tracker default.
#[derive(Debug)]
pub struct RangeTracker {
    chunk_size: f64,
    chunk_sizes: RwLock<HashMap<String, f64>>,
    loaded: RwLock<HashMap<String, IndexRange>>,
}

impl RangeTracker {
    pub fn new(chunk_size: f64) -> Self {
        Self {
            chunk_size,
            chunk_sizes: RwLock::new(HashMap::new()),
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Default chunk width
    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }

    pub fn chunk_size_for(&self, curve_id: &str) -> f64 {
        self.chunk_sizes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(curve_id)
            .copied()
            .unwrap_or(self.chunk_size)
    }

    pub fn set_chunk_size(&self, curve_id: &str, chunk_size: f64) {
        if !(chunk_size.is_finite() && chunk_size > 0.0) {
            tracing::warn!("Ignoring chunk size {} for {}", chunk_size, curve_id);
            return;
        }
        self.chunk_sizes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(curve_id.to_string(), chunk_size);
    }

    /// Double a curve's chunk width, up to `limit`. Used when an edge fetch came
    /// back without any sample past the loaded edge, i.e. the log is sampled more
    /// coarsely than one chunk. Returns the new width.
    pub fn widen(&self, curve_id: &str, limit: f64) -> f64 {
        let mut sizes = self.chunk_sizes.write().unwrap_or_else(PoisonError::into_inner);
        let current = sizes.get(curve_id).copied().unwrap_or(self.chunk_size);
        let widened = (current * 2.0).min(limit.max(current));
        sizes.insert(curve_id.to_string(), widened);
        widened
    }

    pub fn loaded(&self, curve_id: &str) -> Option<IndexRange> {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(curve_id)
            .copied()
    }

    pub(crate) fn record(&self, curve_id: &str, extent: Option<IndexRange>) {
        let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        match extent {
            Some(range) => {
                loaded.insert(curve_id.to_string(), range);
            }
            None => {
                loaded.remove(curve_id);
            }
        }
    }

    pub(crate) fn clear(&self) {
        self.loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Chunk just below the loaded minimum, when `target_lo` lies beneath it and
    /// the domain floor has not been reached.
    pub fn missing_below(&self, curve_id: &str, target_lo: f64, domain: IndexRange) -> Option<ChunkRange> {
        let loaded = self.loaded(curve_id)?;
        if target_lo < loaded.min && loaded.min > domain.min {
            let start = (loaded.min - self.chunk_size_for(curve_id)).max(domain.min);
            return Some(ChunkRange::new(start, loaded.min));
        }
        None
    }

    /// Chunk just above the loaded maximum, capped at the domain end.
    pub fn missing_above(&self, curve_id: &str, target_hi: f64, domain: IndexRange) -> Option<ChunkRange> {
        let loaded = self.loaded(curve_id)?;
        if target_hi > loaded.max && loaded.max < domain.max {
            let end = (loaded.max + self.chunk_size_for(curve_id)).min(domain.max);
            return Some(ChunkRange::new(loaded.max, end));
        }
        None
    }

    /// First chunk for a curve with nothing loaded: centred on the viewport's low
    /// edge and clipped to the domain.
    pub fn initial(&self, curve_id: &str, viewport_lo: f64, domain: IndexRange) -> Option<ChunkRange> {
        if !viewport_lo.is_finite() {
            return None;
        }
        let anchor = viewport_lo.clamp(domain.min, domain.max);
        let half = self.chunk_size_for(curve_id) / 2.0;
        let start = (anchor - half).max(domain.min);
        let end = (anchor + half).min(domain.max);
        Some(ChunkRange::new(start, end))
    }
}
