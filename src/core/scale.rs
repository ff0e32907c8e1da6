use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, unix_seconds_to_datetime};
use crate::core::{Domain, Padding};
use crate::error::{ChartError, ChartResult};

/// Family of the mapping behind a [`Scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScaleKind {
    /// Continuous numeric domain.
    #[default]
    Linear,
    /// Continuous domain in unix seconds.
    Time,
    /// Discrete positions (row indices); only uniform padding is accepted.
    Point,
}

impl ScaleKind {
    #[must_use]
    pub const fn is_discrete(self) -> bool {
        matches!(self, Self::Point)
    }
}

/// Domain <-> range mapping.
///
/// `Clone` is the scale `copy()`: a clone is fully independent, so derived
/// scales can have their domain changed without touching the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    kind: ScaleKind,
    domain: Domain,
    range: (f64, f64),
}

impl Scale {
    pub fn new(kind: ScaleKind, domain: Domain) -> ChartResult<Self> {
        if !domain.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }
        Ok(Self {
            kind,
            domain,
            range: (0.0, 1.0),
        })
    }

    pub fn linear(start: f64, end: f64) -> ChartResult<Self> {
        Self::new(ScaleKind::Linear, Domain::new(start, end))
    }

    #[must_use]
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn range_span(&self) -> f64 {
        (self.range.1 - self.range.0).abs()
    }

    #[must_use]
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    #[must_use]
    pub fn with_range(mut self, start: f64, end: f64) -> Self {
        self.range = (start, end);
        self
    }

    pub fn set_domain(&mut self, domain: Domain) {
        self.domain = domain;
    }

    pub fn set_range(&mut self, start: f64, end: f64) {
        self.range = (start, end);
    }

    /// Maps a domain value to a pixel. A zero-width domain maps to the range
    /// midpoint.
    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        let Domain { start, end } = self.domain;
        let (range_start, range_end) = self.range;
        if end == start {
            return (range_start + range_end) / 2.0;
        }
        range_start + (value - start) / (end - start) * (range_end - range_start)
    }

    /// Maps a pixel back into the domain. A zero-width range maps to the
    /// domain midpoint.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> f64 {
        let Domain { start, end } = self.domain;
        let (range_start, range_end) = self.range;
        if range_end == range_start {
            return (start + end) / 2.0;
        }
        start + (pixel - range_start) / (range_end - range_start) * (end - start)
    }

    /// Domain covered by the range after transforming each range edge.
    #[must_use]
    pub fn invert_range_with(&self, transform: impl Fn(f64) -> f64) -> Domain {
        let (range_start, range_end) = self.range;
        Domain::new(
            self.invert(transform(range_start)),
            self.invert(transform(range_end)),
        )
    }

    #[must_use]
    pub fn map_datetime(&self, time: DateTime<Utc>) -> f64 {
        self.map(datetime_to_unix_seconds(time))
    }

    #[must_use]
    pub fn invert_datetime(&self, pixel: f64) -> Option<DateTime<Utc>> {
        unix_seconds_to_datetime(self.invert(pixel))
    }

    /// Horizontal range for a chart of `width` pixels.
    ///
    /// `flip` reverses the direction so the domain start sits on the right.
    pub fn x_range_for(
        kind: ScaleKind,
        width: f64,
        padding: Padding,
        flip: bool,
    ) -> ChartResult<(f64, f64)> {
        let (left, right) = resolve_padding(kind, padding)?;
        Ok(if flip {
            (width - right, left)
        } else {
            (left, width - right)
        })
    }

    /// Vertical range for a pane of `height` pixels.
    ///
    /// Pixel y grows downwards, so the unflipped range runs bottom to top.
    pub fn y_range_for(
        kind: ScaleKind,
        height: f64,
        padding: Padding,
        flip: bool,
    ) -> ChartResult<(f64, f64)> {
        let (top, bottom) = resolve_padding(kind, padding)?;
        Ok(if flip {
            (top, height - bottom)
        } else {
            (height - bottom, top)
        })
    }
}

fn resolve_padding(kind: ScaleKind, padding: Padding) -> ChartResult<(f64, f64)> {
    let padding = padding.validate()?;
    if kind.is_discrete() {
        let Some(value) = padding.uniform() else {
            return Err(ChartError::InvalidPadding(
                "padding has to be a single number for point scales".to_owned(),
            ));
        };
        return Ok((value, value));
    }
    Ok(padding.sides())
}
