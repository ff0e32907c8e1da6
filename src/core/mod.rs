pub mod accessor;
pub mod pane;
pub mod primitives;
pub mod scale;
pub mod types;
pub mod windowing;

pub use accessor::{XAccessor, YValue, finite_extent, union_extent};
pub use pane::{
    ExtentsInput, PaneConfig, PaneDeclaration, PaneHeight, PaneId, PaneOrigin, YExtents, YPan,
    layout, panes_at, update_y_scales,
};
pub use scale::{Scale, ScaleKind};
pub use types::{Domain, Padding, Point, Viewport};
pub use windowing::{
    ClampFn, ClampPolicy, FallbackEnd, Window, WindowHints, WindowOptions, closest_index,
    rows_in_domain, window,
};

/// Bound on plotted row types.
///
/// With `parallel-extents` enabled rows are shared across worker threads while
/// pane extents are computed, so they must be `Sync`.
#[cfg(feature = "parallel-extents")]
pub trait PlotDatum: Sync {}
#[cfg(feature = "parallel-extents")]
impl<T: Sync> PlotDatum for T {}

/// Bound on plotted row types.
#[cfg(not(feature = "parallel-extents"))]
pub trait PlotDatum {}
#[cfg(not(feature = "parallel-extents"))]
impl<T> PlotDatum for T {}
