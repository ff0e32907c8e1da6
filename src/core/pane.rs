use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::accessor::finite_extent;
use crate::core::{Domain, Padding, PlotDatum, Point, Scale, ScaleKind, Viewport, XAccessor, YValue};
use crate::error::{ChartError, ChartResult};

#[cfg(feature = "parallel-extents")]
const PARALLEL_EXTENT_MIN_ROWS: usize = 10_000;

const DEFAULT_Y_DOMAIN: Domain = Domain::new(0.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaneId(u32);

impl PaneId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane#{}", self.0)
    }
}

pub type HeightFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;
pub type OriginFn = Arc<dyn Fn(f64, f64, f64) -> Point + Send + Sync>;
pub type ExtentsFn<T> = Arc<dyn Fn(&ExtentsInput<'_, T>) -> Domain + Send + Sync>;

/// Pane height in pixels.
#[derive(Clone, Default)]
pub enum PaneHeight {
    /// Whole canvas height.
    #[default]
    Fill,
    Absolute(f64),
    /// Function of the canvas height.
    Computed(HeightFn),
}

impl PaneHeight {
    pub fn computed(height: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(height))
    }

    fn resolve(&self, canvas_height: f64) -> f64 {
        match self {
            Self::Fill => canvas_height,
            Self::Absolute(height) => *height,
            Self::Computed(height) => height(canvas_height),
        }
    }
}

/// Top-left corner of a pane in chart-area pixels.
#[derive(Clone)]
pub enum PaneOrigin {
    Absolute(Point),
    /// `(canvas_width, canvas_height, pane_height) -> origin`.
    Computed(OriginFn),
}

impl Default for PaneOrigin {
    fn default() -> Self {
        Self::Absolute(Point::default())
    }
}

impl PaneOrigin {
    pub fn computed(origin: impl Fn(f64, f64, f64) -> Point + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(origin))
    }

    fn resolve(&self, width: f64, height: f64, pane_height: f64) -> Point {
        match self {
            Self::Absolute(origin) => *origin,
            Self::Computed(origin) => origin(width, height, pane_height),
        }
    }
}

/// Inputs handed to a custom y-extents calculator.
pub struct ExtentsInput<'a, T> {
    pub plot_data: &'a [T],
    pub full_data: &'a [T],
    pub x_domain: Domain,
    pub x_accessor: &'a XAccessor<T>,
}

/// How a pane derives its natural y-domain.
pub enum YExtents<T> {
    Literal(Domain),
    /// Min/max over every value produced for the visible rows.
    Values(Vec<YValue<T>>),
    Calculator(ExtentsFn<T>),
}

impl<T> YExtents<T> {
    pub fn calculator(
        calculate: impl Fn(&ExtentsInput<'_, T>) -> Domain + Send + Sync + 'static,
    ) -> Self {
        Self::Calculator(Arc::new(calculate))
    }

    #[must_use]
    pub fn literal(&self) -> Option<Domain> {
        match self {
            Self::Literal(domain) => Some(*domain),
            _ => None,
        }
    }
}

impl<T> Clone for YExtents<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(domain) => Self::Literal(*domain),
            Self::Values(values) => Self::Values(values.clone()),
            Self::Calculator(calculate) => Self::Calculator(Arc::clone(calculate)),
        }
    }
}

/// Resolved pane description supplied by the host.
pub struct PaneDeclaration<T> {
    pub id: PaneId,
    pub height: PaneHeight,
    pub origin: PaneOrigin,
    pub y_extents: YExtents<T>,
    pub y_scale_kind: ScaleKind,
    pub padding: Padding,
    pub flip_y: bool,
    /// Whether the user may take over this pane's y-domain at all.
    pub y_pan: bool,
    pub y_pan_enabled: bool,
}

impl<T> PaneDeclaration<T> {
    #[must_use]
    pub fn new(id: PaneId, y_extents: YExtents<T>) -> Self {
        Self {
            id,
            height: PaneHeight::Fill,
            origin: PaneOrigin::default(),
            y_extents,
            y_scale_kind: ScaleKind::Linear,
            padding: Padding::default(),
            flip_y: false,
            y_pan: true,
            y_pan_enabled: false,
        }
    }

    #[must_use]
    pub fn with_height(mut self, height: PaneHeight) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: PaneOrigin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_y_scale_kind(mut self, kind: ScaleKind) -> Self {
        self.y_scale_kind = kind;
        self
    }

    #[must_use]
    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    #[must_use]
    pub fn with_y_pan(mut self, y_pan: bool) -> Self {
        self.y_pan = y_pan;
        self
    }

    #[must_use]
    pub fn with_y_pan_enabled(mut self, enabled: bool) -> Self {
        self.y_pan_enabled = enabled;
        self
    }
}

impl<T> Clone for PaneDeclaration<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            height: self.height.clone(),
            origin: self.origin.clone(),
            y_extents: self.y_extents.clone(),
            y_scale_kind: self.y_scale_kind,
            padding: self.padding,
            flip_y: self.flip_y,
            y_pan: self.y_pan,
            y_pan_enabled: self.y_pan_enabled,
        }
    }
}

impl<T> fmt::Debug for PaneDeclaration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaneDeclaration")
            .field("id", &self.id)
            .field("y_extents", &self.y_extents.literal())
            .field("y_scale_kind", &self.y_scale_kind)
            .field("padding", &self.padding)
            .field("flip_y", &self.flip_y)
            .field("y_pan", &self.y_pan)
            .field("y_pan_enabled", &self.y_pan_enabled)
            .finish_non_exhaustive()
    }
}

/// Concrete pane geometry and y-scale state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneConfig {
    pub id: PaneId,
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    pub y_scale: Scale,
    /// Natural y-domain of the visible data, ignoring user y-pan/zoom.
    pub real_y_domain: Domain,
    pub y_pan: bool,
    pub y_pan_enabled: bool,
    pub literal_y_extents: Option<Domain>,
}

impl PaneConfig {
    /// `true` when the chart-area `y` falls inside this pane.
    #[must_use]
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.origin.y && y < self.origin.y + self.height
    }

    /// Drops any user y-pan/zoom and returns to the natural domain.
    pub fn reset_y_domain(&mut self) {
        self.y_scale.set_domain(self.real_y_domain);
        self.y_pan_enabled = false;
    }

    /// User-driven y-domain (axis drag or zoom).
    pub fn set_user_y_domain(&mut self, domain: Domain) -> ChartResult<()> {
        if !domain.is_finite() {
            return Err(ChartError::InvalidData(
                "pane y domain must be finite".to_owned(),
            ));
        }
        self.y_scale.set_domain(domain);
        if self.y_pan {
            self.y_pan_enabled = true;
        }
        Ok(())
    }
}

/// Cumulative vertical drag applied to the panes under the pointer.
#[derive(Debug, Clone, Copy)]
pub struct YPan<'a> {
    pub dy: f64,
    pub panes: &'a [PaneId],
}

/// Builds pane geometry for `declarations`, keeping user y-domains from
/// `previous` where the pane already existed.
pub fn layout<T>(
    viewport: Viewport,
    declarations: &[PaneDeclaration<T>],
    previous: Option<&[PaneConfig]>,
) -> ChartResult<Vec<PaneConfig>> {
    let viewport = viewport.validate()?;
    let width = f64::from(viewport.width);
    let canvas_height = f64::from(viewport.height);

    let mut seen = HashSet::with_capacity(declarations.len());
    for declaration in declarations {
        if !seen.insert(declaration.id) {
            return Err(ChartError::DuplicatePaneId(declaration.id));
        }
    }

    declarations
        .iter()
        .map(|declaration| {
            let height = declaration.height.resolve(canvas_height);
            if !height.is_finite() || height < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "{} height must be finite and >= 0",
                    declaration.id
                )));
            }
            let origin = declaration.origin.resolve(width, canvas_height, height);
            let (range_start, range_end) = Scale::y_range_for(
                declaration.y_scale_kind,
                height,
                declaration.padding,
                declaration.flip_y,
            )?;

            let literal = declaration.y_extents.literal();
            let existing = previous
                .and_then(|configs| configs.iter().find(|config| config.id == declaration.id));

            let mut y_pan_enabled = declaration.y_pan_enabled && declaration.y_pan;
            let mut domain = literal.unwrap_or(DEFAULT_Y_DOMAIN);
            let mut real_y_domain = domain;
            if let Some(existing) = existing {
                real_y_domain = existing.real_y_domain;
                if existing.y_pan_enabled && declaration.y_pan {
                    let kept = existing.y_scale.domain();
                    if literal == Some(kept) {
                        y_pan_enabled = false;
                    } else {
                        domain = kept;
                        y_pan_enabled = true;
                    }
                }
            }

            let y_scale = Scale::new(declaration.y_scale_kind, domain)?
                .with_range(range_start, range_end);
            Ok(PaneConfig {
                id: declaration.id,
                origin,
                width,
                height,
                y_scale,
                real_y_domain,
                y_pan: declaration.y_pan,
                y_pan_enabled,
                literal_y_extents: literal,
            })
        })
        .collect()
}

/// Recomputes every pane's natural y-domain from the visible rows and picks
/// the domain each y-scale shows.
///
/// Panes owned by the user (`y_pan && y_pan_enabled`) keep their domain, or
/// follow `pan` when they are among the panned panes.
pub fn update_y_scales<T: PlotDatum>(
    configs: &[PaneConfig],
    declarations: &[PaneDeclaration<T>],
    input: &ExtentsInput<'_, T>,
    pan: Option<YPan<'_>>,
) -> Vec<PaneConfig> {
    configs
        .iter()
        .zip(declarations)
        .map(|(config, declaration)| {
            let real_y_domain =
                natural_y_domain(&declaration.y_extents, input).unwrap_or(config.real_y_domain);
            let shown = if config.y_pan && config.y_pan_enabled {
                match pan {
                    Some(pan) if pan.panes.contains(&config.id) => {
                        config.y_scale.invert_range_with(|pixel| pixel - pan.dy)
                    }
                    _ => config.y_scale.domain(),
                }
            } else {
                real_y_domain
            };

            let mut updated = config.clone();
            updated.y_scale.set_domain(shown);
            updated.real_y_domain = real_y_domain;
            updated
        })
        .collect()
}

fn natural_y_domain<T: PlotDatum>(
    extents: &YExtents<T>,
    input: &ExtentsInput<'_, T>,
) -> Option<Domain> {
    let domain = match extents {
        YExtents::Literal(domain) => Some(*domain),
        YExtents::Values(values) => values_extent(values, input.plot_data),
        YExtents::Calculator(calculate) => Some(calculate(input)),
    };
    domain.filter(|domain| domain.is_finite())
}

#[cfg(not(feature = "parallel-extents"))]
fn values_extent<T: PlotDatum>(values: &[YValue<T>], rows: &[T]) -> Option<Domain> {
    sequential_values_extent(values, rows)
}

#[cfg(feature = "parallel-extents")]
fn values_extent<T: PlotDatum>(values: &[YValue<T>], rows: &[T]) -> Option<Domain> {
    use rayon::prelude::*;

    if rows.len() < PARALLEL_EXTENT_MIN_ROWS {
        return sequential_values_extent(values, rows);
    }
    rows.par_chunks(PARALLEL_EXTENT_MIN_ROWS / 4)
        .map(|chunk| sequential_values_extent(values, chunk))
        .reduce(|| None, crate::core::accessor::union_extent)
}

fn sequential_values_extent<T>(values: &[YValue<T>], rows: &[T]) -> Option<Domain> {
    let mut buffer: SmallVec<[f64; 8]> = SmallVec::new();
    finite_extent(rows.iter().flat_map(|row| {
        buffer.clear();
        for value in values {
            value.push_values(row, &mut buffer);
        }
        buffer.clone()
    }))
}

/// Ids of the panes whose vertical band contains `y`.
#[must_use]
pub fn panes_at(configs: &[PaneConfig], y: f64) -> SmallVec<[PaneId; 4]> {
    configs
        .iter()
        .filter(|config| config.contains_y(y))
        .map(|config| config.id)
        .collect()
}
