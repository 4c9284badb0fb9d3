// Log stream domain model - header metadata for one logical row source
use super::range::IndexRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Depth,
    Time,
}

/// Header of a log stream as reported by the backend.
///
/// `start_index`/`end_index` are the declared bounds and may be stale for
/// growing logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamHeader {
    pub stream_id: String,
    pub index_kind: IndexKind,
    #[serde(default)]
    pub unit: String,
    pub index_mnemonic: String,
    pub start_index: f64,
    pub end_index: f64,
    #[serde(default)]
    pub mnemonics: Vec<String>,
    #[serde(default)]
    pub growing: bool,
    #[serde(default)]
    pub null_value: Option<f64>,
}

impl StreamHeader {
    pub fn domain(&self) -> IndexRange {
        IndexRange::new(self.start_index, self.end_index)
    }

    /// An empty mnemonic list means the header did not enumerate its columns.
    pub fn has_mnemonic(&self, mnemonic: &str) -> bool {
        self.mnemonics.is_empty()
            || self
                .mnemonics
                .iter()
                .any(|m| m.eq_ignore_ascii_case(mnemonic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_deserializes_camel_case() {
        let json = r#"{
            "streamId": "well_a_depth",
            "indexKind": "depth",
            "unit": "m",
            "indexMnemonic": "DEPT",
            "startIndex": 0,
            "endIndex": 2000,
            "mnemonics": ["DEPT", "GR", "ROP"],
            "growing": true
        }"#;
        let header: StreamHeader = serde_json::from_str(json).unwrap();
        assert_eq!(header.index_kind, IndexKind::Depth);
        assert_eq!(header.domain(), IndexRange::new(0.0, 2000.0));
        assert!(header.growing);
        assert!(header.null_value.is_none());
        assert!(header.has_mnemonic("gr"));
        assert!(!header.has_mnemonic("RHOB"));
    }
}
