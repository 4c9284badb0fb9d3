// Repository trait for well-log data access
use crate::domain::log_stream::StreamHeader;
use crate::domain::rows::RawRows;
use async_trait::async_trait;

#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Header for one stream: declared domain, mnemonics and growing flag
    async fn fetch_header(&self, stream_id: &str) -> anyhow::Result<StreamHeader>;

    /// Rows of one stream whose index lies within [start, end]
    /// An empty result means "no data for this range"
    async fn fetch_range(&self, stream_id: &str, start: f64, end: f64) -> anyhow::Result<RawRows>;
}
