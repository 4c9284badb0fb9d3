// Test doubles for the log repository
use crate::application::log_repository::LogRepository;
use crate::domain::log_stream::{IndexKind, StreamHeader};
use crate::domain::rows::RawRows;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

pub fn header(stream_id: &str, start: f64, end: f64, growing: bool) -> StreamHeader {
    StreamHeader {
        stream_id: stream_id.to_string(),
        index_kind: IndexKind::Depth,
        unit: "m".to_string(),
        index_mnemonic: "DEPT".to_string(),
        start_index: start,
        end_index: end,
        mnemonics: vec!["DEPT".to_string(), "GR".to_string(), "ROP".to_string()],
        growing,
        null_value: None,
    }
}

/// Answers every range with one `DEPT,GR,ROP` row per multiple of `step`,
/// where GR = index / 10 and ROP = index / 100.
pub struct FakeRepository {
    step: f64,
    headers: Mutex<HashMap<String, StreamHeader>>,
    calls: Mutex<Vec<(String, f64, f64)>>,
    gate: watch::Sender<bool>,
    failing: AtomicBool,
    empty: AtomicBool,
    hanging: AtomicBool,
}

impl FakeRepository {
    pub fn new(step: f64) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            step,
            headers: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate,
            failing: AtomicBool::new(false),
            empty: AtomicBool::new(false),
            hanging: AtomicBool::new(false),
        }
    }

    pub fn with_header(self, header: StreamHeader) -> Self {
        self.headers
            .lock()
            .unwrap()
            .insert(header.stream_id.clone(), header);
        self
    }

    pub fn calls(&self) -> Vec<(String, f64, f64)> {
        self.calls.lock().unwrap().clone()
    }

    /// Hold every fetch until `open_gate`
    pub fn close_gate(&self) {
        self.gate.send_replace(false);
    }

    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_empty(&self, empty: bool) {
        self.empty.store(empty, Ordering::SeqCst);
    }

    pub fn set_hanging(&self, hanging: bool) {
        self.hanging.store(hanging, Ordering::SeqCst);
    }

    fn rows(&self, start: f64, end: f64) -> RawRows {
        let mut data = Vec::new();
        let mut index = (start / self.step).ceil() * self.step;
        while index <= end {
            data.push(format!("{},{},{}", index, index / 10.0, index / 100.0));
            index += self.step;
        }
        RawRows::new(
            vec!["DEPT".to_string(), "GR".to_string(), "ROP".to_string()],
            data,
        )
    }
}

#[async_trait]
impl LogRepository for FakeRepository {
    async fn fetch_header(&self, stream_id: &str) -> anyhow::Result<StreamHeader> {
        self.headers
            .lock()
            .unwrap()
            .get(stream_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown stream {}", stream_id))
    }

    async fn fetch_range(&self, stream_id: &str, start: f64, end: f64) -> anyhow::Result<RawRows> {
        self.calls
            .lock()
            .unwrap()
            .push((stream_id.to_string(), start, end));

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("backend unavailable");
        }
        if self.empty.load(Ordering::SeqCst) {
            return Ok(RawRows::empty());
        }
        Ok(self.rows(start, end))
    }
}
