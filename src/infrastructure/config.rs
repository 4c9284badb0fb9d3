use crate::application::chunk_scheduler::SchedulerSettings;
use crate::application::log_session::{LoaderSettings, StreamSetup};
use crate::application::range_tracker::ChunkSizes;
use crate::domain::curve::{Curve, CurveStyle, ScalePolicy};
use crate::domain::log_stream::IndexKind;
use crate::infrastructure::response_adapter::ResponseShape;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub demo: DemoSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default = "default_header_path")]
    pub header_path: String,
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default)]
    pub shape: ResponseShape,
}

fn default_header_path() -> String {
    "/logs/${stream}/header".to_string()
}

fn default_data_path() -> String {
    "/logs/${stream}/data?start=${start}&end=${end}&shape=${shape}".to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoaderConfig {
    /// Chunk width per index kind, `[loader.chunk_size] depth = .. time = ..`
    pub chunk_size: ChunkSizes,
    pub max_concurrent_fetches: usize,
    pub backfill_max_concurrent: usize,
    pub fetch_timeout_ms: u64,
    pub failure_threshold: u32,
    pub viewport_poll_ms: u64,
    pub viewport_tolerance: f64,
    pub live_poll_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: ChunkSizes::default(),
            max_concurrent_fetches: 2,
            backfill_max_concurrent: 4,
            fetch_timeout_ms: 10_000,
            failure_threshold: 3,
            viewport_poll_ms: 300,
            viewport_tolerance: 2.0,
            live_poll_ms: 5_000,
        }
    }
}

impl LoaderConfig {
    pub fn to_settings(&self) -> LoaderSettings {
        LoaderSettings {
            scheduler: SchedulerSettings {
                chunk_sizes: self.chunk_size,
                max_concurrent_fetches: self.max_concurrent_fetches.max(1),
                backfill_max_concurrent: self.backfill_max_concurrent.max(1),
            },
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            failure_threshold: self.failure_threshold,
            viewport_poll_interval: Duration::from_millis(self.viewport_poll_ms),
            viewport_tolerance: self.viewport_tolerance,
            live_poll_interval: Duration::from_millis(self.live_poll_ms),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DemoSettings {
    pub enabled: bool,
    /// Viewport height, in chunk widths of the scrolled stream
    pub viewport_chunks: f64,
    /// Scroll distance per step, in chunk widths
    pub scroll_chunks: f64,
    pub step_interval_ms: u64,
    pub steps: usize,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            viewport_chunks: 0.4,
            scroll_chunks: 0.2,
            step_interval_ms: 500,
            steps: 40,
        }
    }
}

/// Track templates: which curves to draw from which stream
#[derive(Debug, Deserialize, Clone)]
pub struct TracksConfig {
    #[serde(default)]
    pub streams: Vec<StreamTemplate>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamTemplate {
    pub stream_id: String,
    /// Overrides the loader's chunk width for this stream's index kind
    #[serde(default)]
    pub chunk_size: Option<f64>,
    #[serde(default)]
    pub curves: Vec<CurveTemplate>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurveTemplate {
    pub mnemonic: String,
    pub name: Option<String>,
    #[serde(default)]
    pub style: CurveStyle,
    #[serde(default)]
    pub scale: ScalePolicy,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl TracksConfig {
    pub fn to_setups(&self) -> Vec<StreamSetup> {
        self.streams
            .iter()
            .map(|stream| StreamSetup {
                stream_id: stream.stream_id.clone(),
                curves: stream
                    .curves
                    .iter()
                    .map(|c| c.to_curve(&stream.stream_id))
                    .collect(),
                chunk_size: stream.chunk_size,
            })
            .collect()
    }
}

impl CurveTemplate {
    pub fn to_curve(&self, stream_id: &str) -> Curve {
        let mut curve = Curve::new(stream_id, &self.mnemonic);
        if let Some(name) = &self.name {
            curve.display_name = name.clone();
        }
        curve.style = self.style.clone();
        curve.scale = self.scale;
        curve.visible = self.visible;
        curve
    }
}

/// Synthetic logs served by the mock backend
#[derive(Debug, Deserialize, Clone)]
pub struct MockConfig {
    #[serde(default)]
    pub logs: Vec<MockLogConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MockLogConfig {
    pub id: String,
    pub index_kind: IndexKind,
    #[serde(default)]
    pub unit: String,
    pub index_mnemonic: String,
    pub mnemonics: Vec<String>,
    pub start: f64,
    pub end: f64,
    pub step: f64,
    #[serde(default)]
    pub growing: bool,
    /// Index units appended per second while growing
    #[serde(default)]
    pub growth_per_sec: f64,
}

fn load<T: serde::de::DeserializeOwned>(name: &str) -> anyhow::Result<T> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name))
        .add_source(config::Environment::with_prefix("WELLLOG").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load("config/loader")
}

pub fn load_tracks_config() -> anyhow::Result<TracksConfig> {
    load("config/tracks")
}

pub fn load_mock_config() -> anyhow::Result<MockConfig> {
    load("config/mock")
}
