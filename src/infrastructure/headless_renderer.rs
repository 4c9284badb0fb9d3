// Headless renderer - stands in for the drawing widget in the demo and in tests
use crate::application::curve_renderer::CurveRenderer;
use crate::domain::viewport::Viewport;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// Keeps the last arrays pushed per curve and a settable visible range.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    viewport: RwLock<Option<Viewport>>,
    curves: RwLock<HashMap<String, (Vec<f64>, Vec<f64>)>>,
    updates: AtomicUsize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.write().unwrap_or_else(PoisonError::into_inner) = Some(viewport);
    }

    pub fn values(&self, curve_id: &str) -> Option<(Vec<f64>, Vec<f64>)> {
        self.curves
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(curve_id)
            .cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }
}

impl CurveRenderer for HeadlessRenderer {
    fn set_values(&self, curve_id: &str, indices: &[f64], values: &[f64]) {
        tracing::debug!(
            "Curve {} now has {} points ({:?} .. {:?})",
            curve_id,
            indices.len(),
            indices.first(),
            indices.last()
        );
        self.curves
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(curve_id.to_string(), (indices.to_vec(), values.to_vec()));
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    fn visible_range(&self) -> Option<Viewport> {
        *self.viewport.read().unwrap_or_else(PoisonError::into_inner)
    }
}
