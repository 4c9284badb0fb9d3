// Registered streams and the curves drawn from them
use crate::domain::curve::Curve;
use crate::domain::log_stream::StreamHeader;
use crate::domain::range::IndexRange;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone)]
pub struct StreamEntry {
    pub header: StreamHeader,
    pub curves: Vec<Curve>,
}

impl StreamEntry {
    pub fn stream_id(&self) -> &str {
        &self.header.stream_id
    }

    pub fn domain(&self) -> IndexRange {
        self.header.domain()
    }
}

/// Curves grouped by owning stream, iterated in stream-id order.
#[derive(Debug, Default)]
pub struct StreamCatalog {
    streams: RwLock<BTreeMap<String, StreamEntry>>,
}

impl StreamCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, header: StreamHeader, curves: Vec<Curve>) {
        let mut streams = self.streams.write().unwrap_or_else(PoisonError::into_inner);
        streams.insert(header.stream_id.clone(), StreamEntry { header, curves });
    }

    pub fn stream(&self, stream_id: &str) -> Option<StreamEntry> {
        self.streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(stream_id)
            .cloned()
    }

    pub fn streams(&self) -> Vec<StreamEntry> {
        self.streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn curve(&self, curve_id: &str) -> Option<Curve> {
        self.streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flat_map(|s| s.curves.iter())
            .find(|c| c.id == curve_id)
            .cloned()
    }

    pub fn any_growing(&self) -> bool {
        self.streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|s| s.header.growing)
    }

    pub fn len(&self) -> usize {
        self.streams.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the updated curve, or `None` if no such curve is registered.
    pub fn set_visibility(&self, curve_id: &str, visible: bool) -> Option<Curve> {
        let mut streams = self.streams.write().unwrap_or_else(PoisonError::into_inner);
        let curve = streams
            .values_mut()
            .flat_map(|s| s.curves.iter_mut())
            .find(|c| c.id == curve_id)?;
        curve.visible = visible;
        Some(curve.clone())
    }

    /// Growing logs outrun their header; widen the declared end when data goes past it.
    pub fn extend_domain(&self, stream_id: &str, max_index: f64) {
        let mut streams = self.streams.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = streams.get_mut(stream_id) {
            if max_index > entry.header.end_index {
                tracing::debug!(
                    "Extending domain of {} from {} to {}",
                    stream_id,
                    entry.header.end_index,
                    max_index
                );
                entry.header.end_index = max_index;
            }
        }
    }
}
