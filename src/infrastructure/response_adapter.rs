// Adapters from backend response shapes to raw rows
use crate::domain::rows::RawRows;
use crate::infrastructure::wire::{FlatLogData, NestedLogResponse};
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    #[default]
    Flat,
    Nested,
}

impl ResponseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::Flat => "flat",
            ResponseShape::Nested => "nested",
        }
    }

    pub fn adapter(&self) -> Box<dyn ResponseAdapter> {
        match self {
            ResponseShape::Flat => Box::new(FlatAdapter),
            ResponseShape::Nested => Box::new(NestedAdapter),
        }
    }
}

/// One engine, one adapter per backend response shape.
pub trait ResponseAdapter: Send + Sync {
    fn adapt(&self, body: serde_json::Value) -> anyhow::Result<RawRows>;
}

pub struct FlatAdapter;

impl ResponseAdapter for FlatAdapter {
    fn adapt(&self, body: serde_json::Value) -> anyhow::Result<RawRows> {
        let flat: FlatLogData =
            serde_json::from_value(body).context("Failed to parse flat log data")?;
        Ok(RawRows::new(flat.mnemonics, flat.data))
    }
}

pub struct NestedAdapter;

impl ResponseAdapter for NestedAdapter {
    fn adapt(&self, body: serde_json::Value) -> anyhow::Result<RawRows> {
        let nested: NestedLogResponse =
            serde_json::from_value(body).context("Failed to parse nested log response")?;

        // Only the first log carries data for a single-stream query
        let Some(log_data) = nested.logs.into_iter().next().and_then(|l| l.log_data) else {
            return Ok(RawRows::empty());
        };

        let mnemonics = log_data
            .mnemonic_list
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        Ok(RawRows::new(mnemonics, log_data.data))
    }
}
