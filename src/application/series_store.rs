// Series store - one deduplicated, sorted series per curve
use crate::application::range_tracker::RangeTracker;
use crate::domain::range::IndexRange;
use crate::domain::series::{SamplePoint, Series};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Sole writer of curve series and their loaded ranges.
///
/// A merge happens inside one write lock, so readers only ever observe fully
/// merged series, and the tracker is updated before the lock is released.
#[derive(Debug)]
pub struct SeriesStore {
    series: RwLock<HashMap<String, Series>>,
    tracker: Arc<RangeTracker>,
}

impl SeriesStore {
    pub fn new(tracker: Arc<RangeTracker>) -> Self {
        Self {
            series: RwLock::new(HashMap::new()),
            tracker,
        }
    }

    /// Merge one chunk into a curve's series and return the new extent.
    pub fn merge_chunk(&self, curve_id: &str, pairs: Vec<SamplePoint>) -> Option<IndexRange> {
        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        let entry = series.entry(curve_id.to_string()).or_default();
        let accepted = entry.merge(pairs);
        let extent = entry.extent();
        self.tracker.record(curve_id, extent);

        tracing::trace!(
            "Merged {} samples into {} (now {} points)",
            accepted,
            curve_id,
            entry.len()
        );
        extent
    }

    /// Samples of a curve with `lo <= index <= hi`; unknown curves yield nothing.
    pub fn get_range(&self, curve_id: &str, lo: f64, hi: f64) -> Vec<SamplePoint> {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(curve_id)
            .map(|s| s.range(lo, hi).to_vec())
            .unwrap_or_default()
    }

    pub fn series(&self, curve_id: &str) -> Series {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(curve_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn extent(&self, curve_id: &str) -> Option<IndexRange> {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(curve_id)
            .and_then(Series::extent)
    }

    pub fn tracker(&self) -> &Arc<RangeTracker> {
        &self.tracker
    }

    /// Scene rebuild
    pub fn clear(&self) {
        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        series.clear();
        self.tracker.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SeriesStore {
        SeriesStore::new(Arc::new(RangeTracker::new(500.0)))
    }

    fn pts(raw: &[(f64, f64)]) -> Vec<SamplePoint> {
        raw.iter().map(|&(i, v)| SamplePoint::new(i, v)).collect()
    }

    #[test]
    fn test_merge_updates_loaded_range() {
        let store = store();
        store.merge_chunk("gr", pts(&[(100.0, 1.0), (200.0, 2.0), (300.0, 3.0)]));
        store.merge_chunk("gr", pts(&[(200.0, 2.5), (250.0, 2.7), (400.0, 4.0)]));

        assert_eq!(
            store.series("gr").points(),
            pts(&[
                (100.0, 1.0),
                (200.0, 2.5),
                (250.0, 2.7),
                (300.0, 3.0),
                (400.0, 4.0)
            ])
            .as_slice()
        );
        let expected = Some(IndexRange::new(100.0, 400.0));
        assert_eq!(store.extent("gr"), expected);
        assert_eq!(store.tracker().loaded("gr"), expected);
    }

    #[test]
    fn test_unknown_curve_is_empty() {
        let store = store();
        assert!(store.series("missing").is_empty());
        assert!(store.get_range("missing", 0.0, 10.0).is_empty());
        assert_eq!(store.extent("missing"), None);
    }

    #[test]
    fn test_get_range_filters_inclusive() {
        let store = store();
        store.merge_chunk("gr", pts(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]));
        assert_eq!(store.get_range("gr", 2.0, 3.0), pts(&[(2.0, 2.0), (3.0, 3.0)]));
    }

    #[test]
    fn test_clear_drops_series_and_ranges() {
        let store = store();
        store.merge_chunk("gr", pts(&[(1.0, 1.0)]));
        store.clear();
        assert!(store.series("gr").is_empty());
        assert!(store.tracker().loaded("gr").is_none());
    }

    #[test]
    fn test_empty_chunk_on_new_curve_leaves_no_range() {
        let store = store();
        assert_eq!(store.merge_chunk("gr", Vec::new()), None);
        assert!(store.tracker().loaded("gr").is_none());
    }
}
