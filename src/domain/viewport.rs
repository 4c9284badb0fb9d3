// Visible index window reported by the rendering widget

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub lo: f64,
    pub hi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Toward lower indices (shallower depth, older time)
    Up,
    Down,
    Unchanged,
}

impl Viewport {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    /// Widgets report (0, 0) before their first layout.
    pub fn is_ready(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && !(self.lo == 0.0 && self.hi == 0.0)
    }

    pub fn differs_from(&self, other: &Viewport, tolerance: f64) -> bool {
        (self.lo - other.lo).abs() > tolerance || (self.hi - other.hi).abs() > tolerance
    }

    pub fn direction_from(&self, previous: Option<&Viewport>) -> ScrollDirection {
        match previous {
            Some(prev) if self.lo < prev.lo => ScrollDirection::Up,
            Some(prev) if self.lo > prev.lo => ScrollDirection::Down,
            _ => ScrollDirection::Unchanged,
        }
    }
}
