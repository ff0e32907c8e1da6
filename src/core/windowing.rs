use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Domain, Scale, XAccessor};
use crate::error::{ChartError, ChartResult};

// Absorbs float noise before flooring pixel widths.
const PIXEL_EPSILON: f64 = 1e-6;

/// User supplied clamp: `(requested_domain, data_extent) -> domain`.
#[derive(Clone)]
pub struct ClampFn(Arc<dyn Fn(Domain, Domain) -> Domain + Send + Sync>);

impl ClampFn {
    pub fn new(clamp: impl Fn(Domain, Domain) -> Domain + Send + Sync + 'static) -> Self {
        Self(Arc::new(clamp))
    }
}

impl fmt::Debug for ClampFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClampFn(..)")
    }
}

impl PartialEq for ClampFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Which edges of a requested domain are held inside the data extent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ClampPolicy {
    #[default]
    None,
    Both,
    Left,
    Right,
    #[serde(skip)]
    Custom(ClampFn),
}

impl ClampPolicy {
    #[must_use]
    pub fn apply(&self, requested: Domain, data_extent: Domain) -> Domain {
        let (clamp_left, clamp_right) = match self {
            Self::None => return requested,
            Self::Custom(clamp) => return (clamp.0)(requested, data_extent),
            Self::Both => (true, true),
            Self::Left => (true, false),
            Self::Right => (false, true),
        };
        let mut min = requested.min();
        let mut max = requested.max();
        if clamp_left {
            min = min.max(data_extent.min());
        }
        if clamp_right {
            max = max.min(data_extent.max());
        }
        Domain::new(min, max).oriented_like(requested)
    }
}

/// Density and clamp settings for [`window`].
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub clamp: ClampPolicy,
    pub points_per_px_threshold: f64,
    pub min_points_per_px_threshold: f64,
    pub use_whole_data: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            clamp: ClampPolicy::None,
            points_per_px_threshold: 2.0,
            min_points_per_px_threshold: 1.0 / 100.0,
            use_whole_data: false,
        }
    }
}

impl WindowOptions {
    pub fn validate(&self) -> ChartResult<()> {
        if !self.points_per_px_threshold.is_finite() || self.points_per_px_threshold <= 0.0 {
            return Err(ChartError::InvalidData(
                "points per px threshold must be finite and > 0".to_owned(),
            ));
        }
        if !self.min_points_per_px_threshold.is_finite()
            || self.min_points_per_px_threshold < 0.0
            || self.min_points_per_px_threshold > self.points_per_px_threshold
        {
            return Err(ChartError::InvalidData(
                "min points per px threshold must be finite, >= 0 and <= the max threshold"
                    .to_owned(),
            ));
        }
        Ok(())
    }
}

/// Where the last row sat on screen before an append.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackEnd {
    pub last_x: f64,
    pub last_item_px: f64,
}

/// Optional anchors that let the windower keep a previous result instead of
/// producing an unusable one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowHints {
    pub current: Option<Window>,
    pub fallback_start: Option<f64>,
    pub fallback_end: Option<FallbackEnd>,
}

impl WindowHints {
    #[must_use]
    pub fn keep_current(current: Window) -> Self {
        Self {
            current: Some(current),
            ..Self::default()
        }
    }
}

/// Visible slice of the full dataset plus the domain it was resolved for.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub range: Range<usize>,
    pub domain: Domain,
}

impl Window {
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Resolves the visible rows for `candidate`.
///
/// `data` must be sorted by `x_accessor`. `scale` supplies the pixel range
/// used by the density guard; its domain is ignored.
pub fn window<T>(
    data: &[T],
    x_accessor: &XAccessor<T>,
    candidate: Domain,
    scale: &Scale,
    options: &WindowOptions,
    hints: &WindowHints,
) -> ChartResult<Window> {
    if !candidate.is_finite() {
        return Err(ChartError::InvalidData(
            "window domain must be finite".to_owned(),
        ));
    }

    let (first, last) = match (data.first(), data.last()) {
        (Some(first), Some(last)) => (x_accessor.value(first), x_accessor.value(last)),
        _ => {
            return Ok(Window {
                range: 0..0,
                domain: Domain::point(candidate.start),
            });
        }
    };

    if options.use_whole_data {
        return Ok(Window {
            range: 0..data.len(),
            domain: candidate,
        });
    }

    if data.len() == 1 {
        return Ok(Window {
            range: 0..1,
            domain: Domain::point(first),
        });
    }

    let mut domain = candidate;
    let mut range = rows_in_domain(data, x_accessor, domain);

    if range.len() == 1
        && let Some(fallback_start) = hints.fallback_start
    {
        let end = hints
            .fallback_end
            .map(|fallback| end_keeping_last_item_px(fallback, fallback_start, scale))
            .unwrap_or(fallback_start + candidate.span());
        domain = Domain::new(fallback_start, end);
        range = rows_in_domain(data, x_accessor, domain);
    }

    let clamped = options.clamp.apply(domain, Domain::new(first, last));
    if clamped != domain {
        domain = clamped;
        range = rows_in_domain(data, x_accessor, domain);
    }

    if range.len() <= 1 {
        if let Some(current) = &hints.current {
            trace!(rows = range.len(), "window too narrow, keeping current window");
            return Ok(current.clone());
        }
        return Ok(Window { range, domain });
    }

    let probe = scale.with_domain(domain);
    let first_px = probe.map(x_accessor.value(&data[range.start]));
    let last_px = probe.map(x_accessor.value(&data[range.end - 1]));
    let width = ((last_px - first_px).abs() + PIXEL_EPSILON).floor();
    let max_points = (width * options.points_per_px_threshold + PIXEL_EPSILON).floor() as usize;
    let min_points = ((width * options.min_points_per_px_threshold).ceil() as usize).max(1);

    let rows = range.len();
    if rows > min_points && rows <= max_points {
        return Ok(Window { range, domain });
    }

    if let Some(current) = &hints.current {
        trace!(
            rows,
            min_points, max_points, "density out of bounds, keeping current window"
        );
        return Ok(current.clone());
    }

    // A data span under two pixels wide sizes the trim from the range width.
    let keep = if max_points >= 2 {
        max_points
    } else {
        range_capacity(scale, options)
    };
    if rows > keep {
        let kept = range.end - keep..range.end;
        let kept_domain = Domain::new(
            x_accessor.value(&data[kept.start]),
            x_accessor.value(&data[kept.end - 1]),
        )
        .oriented_like(candidate);
        trace!(rows, kept = keep, "density guard trimmed window");
        return Ok(Window {
            range: kept,
            domain: kept_domain,
        });
    }

    Ok(Window { range, domain })
}

/// Rows whose x lies inside the domain edges (inclusive), by binary search.
#[must_use]
pub fn rows_in_domain<T>(data: &[T], x_accessor: &XAccessor<T>, domain: Domain) -> Range<usize> {
    let (min, max) = (domain.min(), domain.max());
    let start = data.partition_point(|datum| x_accessor.value(datum) < min);
    let end = data.partition_point(|datum| x_accessor.value(datum) <= max);
    start..end.max(start)
}

/// Index of the row whose x is closest to `value`.
#[must_use]
pub fn closest_index<T>(data: &[T], x_accessor: &XAccessor<T>, value: f64) -> Option<usize> {
    if data.is_empty() || !value.is_finite() {
        return None;
    }
    let right = data.partition_point(|datum| x_accessor.value(datum) < value);
    if right == 0 {
        return Some(0);
    }
    if right >= data.len() {
        return Some(data.len() - 1);
    }
    let left = right - 1;
    let left_gap = (value - x_accessor.value(&data[left])).abs();
    let right_gap = (x_accessor.value(&data[right]) - value).abs();
    Some(if right_gap < left_gap { right } else { left })
}

/// Most rows the scale's full pixel range can show, never below two.
fn range_capacity(scale: &Scale, options: &WindowOptions) -> usize {
    let width = (scale.range_span() + PIXEL_EPSILON).floor();
    ((width * options.points_per_px_threshold + PIXEL_EPSILON).floor() as usize).max(2)
}

fn end_keeping_last_item_px(fallback: FallbackEnd, start: f64, scale: &Scale) -> f64 {
    let (range_start, range_end) = scale.range();
    let offset_px = fallback.last_item_px - range_start;
    if offset_px.abs() <= f64::EPSILON {
        return start + scale.domain().span();
    }
    start + (fallback.last_x - start) * (range_end - range_start) / offset_px
}

#[cfg(test)]
mod tests {
    use super::{ClampFn, ClampPolicy, WindowHints, WindowOptions, closest_index, window};
    use crate::core::{Domain, Scale, XAccessor};

    fn rows(count: usize) -> Vec<f64> {
        (0..count).map(|i| i as f64).collect()
    }

    fn scale(width: f64) -> Scale {
        Scale::linear(0.0, 1.0)
            .expect("scale")
            .with_range(0.0, width)
    }

    fn filtered() -> WindowOptions {
        WindowOptions {
            use_whole_data: false,
            ..WindowOptions::default()
        }
    }

    #[test]
    fn identity_accessor_can_use_whole_dataset() {
        let data = rows(50);
        let options = WindowOptions {
            use_whole_data: true,
            ..WindowOptions::default()
        };
        let result = window(
            &data,
            &XAccessor::identity(),
            Domain::new(10.0, 20.0),
            &scale(500.0),
            &options,
            &WindowHints::default(),
        )
        .expect("window");
        assert_eq!(result.range, 0..50);
        assert_eq!(result.domain, Domain::new(10.0, 20.0));
    }

    #[test]
    fn filters_inclusive_edges() {
        let data = rows(100);
        let result = window(
            &data,
            &XAccessor::identity(),
            Domain::new(10.0, 59.5),
            &scale(500.0),
            &filtered(),
            &WindowHints::default(),
        )
        .expect("window");
        assert_eq!(result.range, 10..60);
    }

    #[test]
    fn clamp_left_holds_start_on_first_row() {
        let data = rows(100);
        let options = WindowOptions {
            clamp: ClampPolicy::Left,
            ..filtered()
        };
        let result = window(
            &data,
            &XAccessor::identity(),
            Domain::new(-30.0, 40.0),
            &scale(500.0),
            &options,
            &WindowHints::default(),
        )
        .expect("window");
        assert_eq!(result.domain, Domain::new(0.0, 40.0));
        assert_eq!(result.range, 0..41);
    }

    #[test]
    fn custom_clamp_receives_data_extent() {
        let data = rows(10);
        let options = WindowOptions {
            clamp: ClampPolicy::Custom(ClampFn::new(|_requested, extent| extent)),
            ..filtered()
        };
        let result = window(
            &data,
            &XAccessor::identity(),
            Domain::new(-5.0, 50.0),
            &scale(100.0),
            &options,
            &WindowHints::default(),
        )
        .expect("window");
        assert_eq!(result.domain, Domain::new(0.0, 9.0));
    }

    #[test]
    fn degenerate_datasets_do_not_fail() {
        let empty: Vec<f64> = Vec::new();
        let result = window(
            &empty,
            &XAccessor::identity(),
            Domain::new(3.0, 9.0),
            &scale(100.0),
            &filtered(),
            &WindowHints::default(),
        )
        .expect("empty window");
        assert!(result.is_empty());
        assert!(result.domain.is_degenerate());

        let single = vec![42.0];
        let result = window(
            &single,
            &XAccessor::identity(),
            Domain::new(0.0, 100.0),
            &scale(100.0),
            &filtered(),
            &WindowHints::default(),
        )
        .expect("single window");
        assert_eq!(result.range, 0..1);
        assert_eq!(result.domain, Domain::point(42.0));
    }

    #[test]
    fn too_sparse_request_keeps_current_window() {
        let data = rows(1_000);
        let current = window(
            &data,
            &XAccessor::identity(),
            Domain::new(100.0, 300.0),
            &scale(500.0),
            &filtered(),
            &WindowHints::default(),
        )
        .expect("current");
        let zoomed = window(
            &data,
            &XAccessor::identity(),
            Domain::new(150.0, 152.0),
            &scale(500.0),
            &filtered(),
            &WindowHints::keep_current(current.clone()),
        )
        .expect("zoomed");
        assert_eq!(zoomed, current);
    }

    #[test]
    fn closest_index_prefers_nearest_row() {
        let data = vec![0.0, 10.0, 20.0];
        let accessor = XAccessor::identity();
        assert_eq!(closest_index(&data, &accessor, -4.0), Some(0));
        assert_eq!(closest_index(&data, &accessor, 6.0), Some(1));
        assert_eq!(closest_index(&data, &accessor, 14.0), Some(1));
        assert_eq!(closest_index(&data, &accessor, 99.0), Some(2));
    }
}
