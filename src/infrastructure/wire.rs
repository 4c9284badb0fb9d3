// JSON wire shapes for chunk responses, shared by the HTTP client and the mock server
use serde::{Deserialize, Serialize};

/// `{ "mnemonics": [...], "data": ["row", ...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlatLogData {
    #[serde(default)]
    pub mnemonics: Vec<String>,
    #[serde(default)]
    pub data: Vec<String>,
}

/// `{ "logs": [ { "logData": { "mnemonicList": "A,B", "data": [...] } } ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestedLogResponse {
    #[serde(default)]
    pub logs: Vec<NestedLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedLog {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub log_data: Option<NestedLogData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedLogData {
    pub mnemonic_list: String,
    #[serde(default)]
    pub unit_list: Option<String>,
    #[serde(default)]
    pub data: Vec<String>,
}
