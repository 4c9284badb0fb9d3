// Synthetic log generator backing the mock server
use crate::domain::log_stream::{IndexKind, StreamHeader};
use crate::infrastructure::config::MockLogConfig;
use std::time::Instant;

const MAX_ROWS_PER_QUERY: usize = 10_000;

#[derive(Debug, Clone)]
pub struct MockLog {
    config: MockLogConfig,
    started: Instant,
}

impl MockLog {
    pub fn new(config: MockLogConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Declared end; growing logs advance with wall-clock time.
    pub fn current_end(&self) -> f64 {
        if !self.config.growing {
            return self.config.end;
        }
        self.config.end + self.started.elapsed().as_secs_f64() * self.config.growth_per_sec
    }

    pub fn header(&self) -> StreamHeader {
        StreamHeader {
            stream_id: self.config.id.clone(),
            index_kind: self.config.index_kind,
            unit: self.config.unit.clone(),
            index_mnemonic: self.config.index_mnemonic.clone(),
            start_index: self.config.start,
            end_index: self.current_end(),
            mnemonics: self.config.mnemonics.clone(),
            growing: self.config.growing,
            null_value: None,
        }
    }

    pub fn mnemonics(&self) -> &[String] {
        &self.config.mnemonics
    }

    /// Rows with `start <= index <= end`, on the log's sampling grid.
    pub fn rows(&self, start: f64, end: f64) -> Vec<String> {
        let step = self.config.step;
        if step <= 0.0 || !start.is_finite() || !end.is_finite() {
            return Vec::new();
        }
        let lo = start.max(self.config.start);
        let hi = end.min(self.current_end());
        if lo > hi {
            return Vec::new();
        }

        let first = ((lo - self.config.start) / step).ceil() as u64;
        let mut rows = Vec::new();
        for k in first.. {
            let index = self.config.start + k as f64 * step;
            if index > hi || rows.len() >= MAX_ROWS_PER_QUERY {
                break;
            }
            rows.push(self.row(index));
        }
        rows
    }

    fn row(&self, index: f64) -> String {
        let mut fields = Vec::with_capacity(self.config.mnemonics.len());
        for (column, mnemonic) in self.config.mnemonics.iter().enumerate() {
            if mnemonic.eq_ignore_ascii_case(&self.config.index_mnemonic) {
                fields.push(self.format_index(index));
            } else {
                fields.push(format!("{:.3}", synthetic_value(column, index)));
            }
        }
        fields.join(",")
    }

    fn format_index(&self, index: f64) -> String {
        match self.config.index_kind {
            IndexKind::Depth => index.to_string(),
            IndexKind::Time => chrono::DateTime::from_timestamp_millis(index as i64)
                .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
                .unwrap_or_else(|| index.to_string()),
        }
    }
}

/// Smooth, column-dependent signal so each curve looks different.
fn synthetic_value(column: usize, index: f64) -> f64 {
    let period = 50.0 + 37.0 * column as f64;
    let base = 20.0 * column as f64;
    base + 10.0 * (index / period).sin() + 2.0 * (index / (period * 0.13)).cos()
}
