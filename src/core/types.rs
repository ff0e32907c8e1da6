use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Pixel size of the chart area shared by every pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }
}

/// Pane-area relative pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset_from(self, origin: Self) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// Data-space interval mapped onto an axis.
///
/// `start` and `end` keep the orientation they were created with; callers
/// that need ordered edges use [`Domain::min`] / [`Domain::max`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub start: f64,
    pub end: f64,
}

impl Domain {
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Zero-width domain used for degenerate datasets.
    #[must_use]
    pub const fn point(value: f64) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.start.min(self.end)
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.start.max(self.end)
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min() && value <= self.max()
    }

    #[must_use]
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        (self.start - other.start).abs() <= tolerance && (self.end - other.end).abs() <= tolerance
    }

    /// Returns a domain with `self`'s orientation spanning `other`'s edges.
    #[must_use]
    pub fn oriented_like(self, reference: Self) -> Self {
        if (reference.start <= reference.end) == (self.start <= self.end) {
            self
        } else {
            Self::new(self.end, self.start)
        }
    }
}

impl From<(f64, f64)> for Domain {
    fn from((start, end): (f64, f64)) -> Self {
        Self { start, end }
    }
}

/// Range inset applied between the axis pixel extent and the plotted range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Padding {
    Uniform(f64),
    /// Separate insets for the range start (left/top) and end (right/bottom).
    Sides { start: f64, end: f64 },
}

impl Default for Padding {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

impl Padding {
    #[must_use]
    pub fn sides(self) -> (f64, f64) {
        match self {
            Self::Uniform(value) => (value, value),
            Self::Sides { start, end } => (start, end),
        }
    }

    #[must_use]
    pub fn uniform(self) -> Option<f64> {
        match self {
            Self::Uniform(value) => Some(value),
            Self::Sides { .. } => None,
        }
    }

    pub fn validate(self) -> ChartResult<Self> {
        let (start, end) = self.sides();
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end < 0.0 {
            return Err(ChartError::InvalidPadding(
                "padding must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}
