// In-flight request registry and fetch health tracking
use crate::domain::range::{RequestKey, RequestKind};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct RegistryState {
    in_flight: HashSet<RequestKey>,
    failures: HashMap<RequestKey, u32>,
}

/// Advisory bookkeeping preventing duplicate dispatch of the same key.
///
/// Markers are released by dropping the [`InFlightGuard`], which happens on every
/// fetch outcome, including timeout and task abort.
#[derive(Debug)]
pub struct InFlightRegistry {
    state: Mutex<RegistryState>,
    failure_threshold: u32,
}

/// Keys whose consecutive failures reached the threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchHealth {
    pub in_flight: usize,
    pub failing: Vec<(String, u32)>,
}

impl FetchHealth {
    pub fn is_healthy(&self) -> bool {
        self.failing.is_empty()
    }
}

impl InFlightRegistry {
    pub fn new(failure_threshold: u32) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RegistryState::default()),
            failure_threshold: failure_threshold.max(1),
        })
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `key` in flight, or `None` if it already is.
    pub fn try_acquire(self: &Arc<Self>, key: RequestKey) -> Option<InFlightGuard> {
        let mut state = self.lock();
        if !state.in_flight.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            key,
            registry: Arc::clone(self),
        })
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.lock().in_flight.contains(key)
    }

    pub fn active(&self, kind: RequestKind) -> usize {
        self.lock()
            .in_flight
            .iter()
            .filter(|k| k.kind() == kind)
            .count()
    }

    pub fn record_success(&self, key: &RequestKey) {
        self.lock().failures.remove(key);
    }

    /// Count a consecutive failure; returns the new count.
    pub fn record_failure(&self, key: &RequestKey) -> u32 {
        let count = {
            let mut state = self.lock();
            let count = state.failures.entry(key.clone()).or_insert(0);
            *count += 1;
            *count
        };
        if count == self.failure_threshold {
            tracing::warn!(
                "Request {} failed {} times in a row, reporting as persistent failure",
                key,
                count
            );
        }
        count
    }

    pub fn health(&self) -> FetchHealth {
        let state = self.lock();
        let mut failing: Vec<(String, u32)> = state
            .failures
            .iter()
            .filter(|(_, count)| **count >= self.failure_threshold)
            .map(|(key, count)| (key.to_string(), *count))
            .collect();
        failing.sort();
        FetchHealth {
            in_flight: state.in_flight.len(),
            failing,
        }
    }

    pub fn reset_failures(&self) {
        self.lock().failures.clear();
    }

    fn release(&self, key: &RequestKey) {
        self.lock().in_flight.remove(key);
    }
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    key: RequestKey,
    registry: Arc<InFlightRegistry>,
}

impl InFlightGuard {
    pub fn key(&self) -> &RequestKey {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}
