// Raw delimited rows returned for one chunk, and extraction of curve samples
use super::log_stream::IndexKind;
use super::series::SamplePoint;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("mnemonic {0} not found in column list")]
    MissingMnemonic(String),
}

/// Tabular chunk payload: one mnemonic list plus delimited text records.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRows {
    pub mnemonics: Vec<String>,
    pub rows: Vec<String>,
    pub delimiter: char,
}

impl RawRows {
    pub fn new(mnemonics: Vec<String>, rows: Vec<String>) -> Self {
        Self {
            mnemonics,
            rows,
            delimiter: ',',
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_of(&self, mnemonic: &str) -> Option<usize> {
        self.mnemonics
            .iter()
            .position(|m| m.trim().eq_ignore_ascii_case(mnemonic))
    }

    /// Extract (index, value) samples for one curve column.
    ///
    /// The index column falls back to the first column when its mnemonic is not
    /// listed. Rows whose index or value does not parse to a finite number, or
    /// whose value equals `null_value`, are skipped.
    pub fn curve_points(
        &self,
        index_mnemonic: &str,
        value_mnemonic: &str,
        index_kind: IndexKind,
        null_value: Option<f64>,
    ) -> Result<Vec<SamplePoint>, RowError> {
        let index_col = self.column_of(index_mnemonic).unwrap_or(0);
        let value_col = self
            .column_of(value_mnemonic)
            .ok_or_else(|| RowError::MissingMnemonic(value_mnemonic.to_string()))?;

        let points = self
            .rows
            .iter()
            .filter_map(|row| {
                let fields: Vec<&str> = row.split(self.delimiter).collect();
                let index = parse_index(fields.get(index_col)?, index_kind)?;
                let value = parse_value(fields.get(value_col)?, null_value)?;
                Some(SamplePoint::new(index, value))
            })
            .collect();

        Ok(points)
    }
}

/// Depth indices are plain numbers; time indices may also be RFC 3339 stamps,
/// which map to epoch milliseconds.
fn parse_index(raw: &str, kind: IndexKind) -> Option<f64> {
    let raw = raw.trim();
    if let Ok(number) = raw.parse::<f64>() {
        return number.is_finite().then_some(number);
    }
    match kind {
        IndexKind::Depth => None,
        IndexKind::Time => chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.timestamp_millis() as f64),
    }
}

fn parse_value(raw: &str, null_value: Option<f64>) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    match null_value {
        Some(null) if value == null => None,
        _ => Some(value),
    }
}
