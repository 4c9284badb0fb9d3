// Rendering widget seam - the widget draws, this crate only feeds it
use crate::domain::viewport::Viewport;

pub trait CurveRenderer: Send + Sync {
    /// Replace a curve's data with two parallel arrays sorted by index
    fn set_values(&self, curve_id: &str, indices: &[f64], values: &[f64]);

    /// Current visible index window, `None` until the widget exists
    fn visible_range(&self) -> Option<Viewport>;
}
