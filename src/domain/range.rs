// Index ranges, chunk requests and their in-flight keys
use std::fmt;

/// Closed span of indices, used both for loaded extents and declared log domains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexRange {
    pub min: f64,
    pub max: f64,
}

impl IndexRange {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, index: f64) -> bool {
        index >= self.min && index <= self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// One bounded fetch window. Keys render it as `[start,end)`; backends answer
/// with every row whose index lies in `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkRange {
    pub start: f64,
    pub end: f64,
}

impl ChunkRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, index: f64) -> bool {
        index >= self.start && index <= self.end
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Viewport-driven chunk
    Scroll,
    /// Data beyond the loaded maximum of a growing log
    Live,
}

/// Dedup token for a fetch: `stream_start_end`, or `live_stream_start_end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    kind: RequestKind,
    text: String,
}

impl RequestKey {
    pub fn scroll(stream_id: &str, range: ChunkRange) -> Self {
        Self {
            kind: RequestKind::Scroll,
            text: format!("{}_{}_{}", stream_id, range.start, range.end),
        }
    }

    pub fn live(stream_id: &str, range: ChunkRange) -> Self {
        Self {
            kind: RequestKind::Live,
            text: format!("live_{}_{}_{}", stream_id, range.start, range.end),
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRequest {
    pub stream_id: String,
    pub range: ChunkRange,
    pub key: RequestKey,
}

impl ChunkRequest {
    pub fn scroll(stream_id: &str, range: ChunkRange) -> Self {
        Self {
            stream_id: stream_id.to_string(),
            range,
            key: RequestKey::scroll(stream_id, range),
        }
    }

    pub fn live(stream_id: &str, range: ChunkRange) -> Self {
        Self {
            stream_id: stream_id.to_string(),
            range,
            key: RequestKey::live(stream_id, range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_keys() {
        let range = ChunkRange::new(1000.0, 1500.0);
        assert_eq!(RequestKey::scroll("well_a", range).as_str(), "well_a_1000_1500");
        assert_eq!(RequestKey::live("well_a", range).as_str(), "live_well_a_1000_1500");
        assert_ne!(RequestKey::scroll("live_a", range), RequestKey::live("a", range));
    }

    #[test]
    fn test_index_range_orders_bounds() {
        let range = IndexRange::new(30.0, 10.0);
        assert_eq!(range.min, 10.0);
        assert_eq!(range.max, 30.0);
        assert!(range.contains(10.0));
        assert!(range.contains(30.0));
        assert!(!range.contains(30.5));
    }
}
