// Application state for the mock log server handlers
use crate::infrastructure::config::MockLogConfig;
use crate::presentation::mock_log::MockLog;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct MockServerState {
    pub logs: BTreeMap<String, MockLog>,
}

impl MockServerState {
    pub fn from_logs(configs: &[MockLogConfig]) -> Self {
        let logs = configs
            .iter()
            .cloned()
            .map(|c| (c.id.clone(), MockLog::new(c)))
            .collect();
        Self { logs }
    }
}
