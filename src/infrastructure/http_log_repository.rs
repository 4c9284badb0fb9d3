// HTTP log repository implementation
use crate::application::log_repository::LogRepository;
use crate::domain::log_stream::StreamHeader;
use crate::domain::rows::RawRows;
use crate::infrastructure::config::BackendSettings;
use crate::infrastructure::response_adapter::{ResponseAdapter, ResponseShape};
use anyhow::{Context, Result};
use async_trait::async_trait;

pub struct HttpLogRepository {
    base_url: String,
    header_path: String,
    data_path: String,
    shape: ResponseShape,
    adapter: Box<dyn ResponseAdapter>,
    client: reqwest::Client,
}

impl HttpLogRepository {
    pub fn new(base_url: String, header_path: String, data_path: String, shape: ResponseShape) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            header_path,
            data_path,
            shape,
            adapter: shape.adapter(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_settings(settings: &BackendSettings) -> Self {
        Self::new(
            settings.base_url.clone(),
            settings.header_path.clone(),
            settings.data_path.clone(),
            settings.shape,
        )
    }

    fn build_url(&self, template: &str, vars: &[(&str, &str)]) -> Result<String> {
        Ok(format!("{}{}", self.base_url, expand_path(template, vars)?))
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to log backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Log backend request failed with status {}: {}", status, body);
        }

        response
            .json::<serde_json::Value>()
            .await
            .context("Failed to parse log backend response")
    }
}

/// Expand `${name}` placeholders of a path template. Values are percent-encoded,
/// so a stream id may contain spaces or slashes; template text is kept verbatim.
fn expand_path(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("${") {
        path.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after
            .find('}')
            .with_context(|| format!("Unterminated placeholder in {}", template))?;
        let name = &after[..close];
        let value = vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .with_context(|| format!("Unknown placeholder ${{{}}} in {}", name, template))?;
        path.push_str(&urlencoding::encode(value));
        rest = &after[close + 1..];
    }
    path.push_str(rest);
    Ok(path)
}

#[async_trait]
impl LogRepository for HttpLogRepository {
    async fn fetch_header(&self, stream_id: &str) -> Result<StreamHeader> {
        let url = self.build_url(&self.header_path, &[("stream", stream_id)])?;
        tracing::debug!("Fetching header: {}", url);

        let body = self.get_json(&url).await?;
        serde_json::from_value(body).with_context(|| format!("Invalid header for stream {}", stream_id))
    }

    async fn fetch_range(&self, stream_id: &str, start: f64, end: f64) -> Result<RawRows> {
        let (start_text, end_text) = (start.to_string(), end.to_string());
        let vars = [
            ("stream", stream_id),
            ("start", start_text.as_str()),
            ("end", end_text.as_str()),
            ("shape", self.shape.as_str()),
        ];
        let url = self.build_url(&self.data_path, &vars)?;
        tracing::debug!("Fetching range: {}", url);

        let body = self.get_json(&url).await?;
        let rows = self.adapter.adapt(body)?;

        tracing::debug!("Got {} rows for {} [{}, {}]", rows.len(), stream_id, start, end);
        Ok(rows)
    }
}
