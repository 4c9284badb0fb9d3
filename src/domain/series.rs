// Per-curve sample series with last-write-wins merge
use super::range::IndexRange;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub index: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(index: f64, value: f64) -> Self {
        Self { index, value }
    }

    pub fn is_finite(&self) -> bool {
        self.index.is_finite() && self.value.is_finite()
    }
}

/// Sorted, index-unique sequence of samples.
///
/// The only mutation is [`Series::merge`], so `points[i].index < points[i + 1].index`
/// always holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<SamplePoint>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a chunk into the series and return how many samples were accepted.
    ///
    /// Non-finite samples are dropped. On a duplicate index the newest sample wins,
    /// including duplicates inside the chunk itself (later rows win).
    pub fn merge<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = SamplePoint>,
    {
        let mut merged = std::mem::take(&mut self.points);
        let existing = merged.len();

        // +0.0 folds -0.0 into 0.0 so both land on the same index
        merged.extend(
            pairs
                .into_iter()
                .filter(SamplePoint::is_finite)
                .map(|p| SamplePoint::new(p.index + 0.0, p.value)),
        );
        let accepted = merged.len() - existing;

        // stable: for equal indices, arrival order is preserved
        merged.sort_by(|a, b| a.index.total_cmp(&b.index));

        let mut deduped: Vec<SamplePoint> = Vec::with_capacity(merged.len());
        for point in merged {
            match deduped.last_mut() {
                Some(last) if last.index == point.index => *last = point,
                _ => deduped.push(point),
            }
        }

        self.points = deduped;
        accepted
    }

    pub fn extent(&self) -> Option<IndexRange> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some(IndexRange {
                min: first.index,
                max: last.index,
            }),
            _ => None,
        }
    }

    /// Samples with `lo <= index <= hi`.
    pub fn range(&self, lo: f64, hi: f64) -> &[SamplePoint] {
        let start = self.points.partition_point(|p| p.index < lo);
        let end = self.points.partition_point(|p| p.index <= hi);
        if start >= end {
            return &[];
        }
        &self.points[start..end]
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn indices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.index).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<SamplePoint> {
        raw.iter().map(|&(i, v)| SamplePoint::new(i, v)).collect()
    }

    fn assert_strictly_ascending(series: &Series) {
        for pair in series.points().windows(2) {
            assert!(pair[0].index < pair[1].index, "{:?}", pair);
        }
    }

    #[test]
    fn test_merge_overwrites_and_sorts() {
        let mut series = Series::new();
        series.merge(pts(&[(100.0, 1.0), (200.0, 2.0), (300.0, 3.0)]));
        series.merge(pts(&[(200.0, 2.5), (250.0, 2.7), (400.0, 4.0)]));

        assert_eq!(
            series.points(),
            pts(&[
                (100.0, 1.0),
                (200.0, 2.5),
                (250.0, 2.7),
                (300.0, 3.0),
                (400.0, 4.0)
            ])
            .as_slice()
        );
        assert_eq!(series.extent(), Some(IndexRange::new(100.0, 400.0)));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let chunk = pts(&[(5.0, 0.5), (1.0, 0.1), (3.0, 0.3)]);
        let mut once = Series::new();
        once.merge(chunk.clone());
        let mut twice = once.clone();
        twice.merge(chunk);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_drops_non_finite() {
        let mut series = Series::new();
        let accepted = series.merge(pts(&[
            (1.0, 1.0),
            (f64::NAN, 2.0),
            (3.0, f64::INFINITY),
            (4.0, 4.0),
        ]));
        assert_eq!(accepted, 2);
        assert_eq!(series.indices(), vec![1.0, 4.0]);
    }

    #[test]
    fn test_later_duplicate_in_same_chunk_wins() {
        let mut series = Series::new();
        series.merge(pts(&[(10.0, 1.0), (10.0, 2.0), (-0.0, 7.0), (0.0, 8.0)]));
        assert_eq!(series.points(), pts(&[(0.0, 8.0), (10.0, 2.0)]).as_slice());
    }

    #[test]
    fn test_arbitrary_overlapping_chunks_stay_sorted() {
        let mut series = Series::new();
        let chunks = [
            pts(&[(50.0, 1.0), (10.0, 1.0), (30.0, 1.0)]),
            pts(&[(20.0, 2.0), (50.0, 2.0), (40.0, 2.0)]),
            pts(&[(60.0, 3.0), (0.0, 3.0), (30.0, 3.0), (25.0, 3.0)]),
            pts(&[(15.0, 4.0), (15.0, 4.5)]),
        ];
        for chunk in chunks {
            series.merge(chunk);
            assert_strictly_ascending(&series);
            let extent = series.extent().unwrap();
            assert_eq!(extent.min, series.points()[0].index);
            assert_eq!(extent.max, series.points()[series.len() - 1].index);
        }
        assert_eq!(series.len(), 9);
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut series = Series::new();
        series.merge(pts(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]));
        assert_eq!(series.range(2.0, 3.0), pts(&[(2.0, 2.0), (3.0, 3.0)]).as_slice());
        assert!(series.range(5.0, 9.0).is_empty());
        assert!(series.range(3.0, 2.0).is_empty());
    }
}
