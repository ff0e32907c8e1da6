use std::fmt;
use std::sync::Arc;

use crate::core::{Domain, PaneDeclaration, ScaleKind, XAccessor, finite_extent};

pub type XExtentsFn<T> = Arc<dyn Fn(&[T], &XAccessor<T>) -> Domain + Send + Sync>;

/// Initial x-domain of a chart.
pub enum XExtents<T> {
    /// First to last x value of the dataset.
    FullData,
    Literal(Domain),
    Computed(XExtentsFn<T>),
}

impl<T> XExtents<T> {
    pub fn computed(
        compute: impl Fn(&[T], &XAccessor<T>) -> Domain + Send + Sync + 'static,
    ) -> Self {
        Self::Computed(Arc::new(compute))
    }

    pub(crate) fn resolve(&self, data: &[T], accessor: &XAccessor<T>) -> Domain {
        match self {
            Self::FullData => finite_extent(data.iter().map(|row| accessor.value(row)))
                .unwrap_or(Domain::point(0.0)),
            Self::Literal(domain) => *domain,
            Self::Computed(compute) => compute(data, accessor),
        }
    }

    /// Same literal domain, or the very same computation.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::FullData, Self::FullData) => true,
            (Self::Literal(left), Self::Literal(right)) => left == right,
            (Self::Computed(left), Self::Computed(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl<T> Default for XExtents<T> {
    fn default() -> Self {
        Self::FullData
    }
}

impl<T> Clone for XExtents<T> {
    fn clone(&self) -> Self {
        match self {
            Self::FullData => Self::FullData,
            Self::Literal(domain) => Self::Literal(*domain),
            Self::Computed(compute) => Self::Computed(Arc::clone(compute)),
        }
    }
}

impl<T> fmt::Debug for XExtents<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullData => f.write_str("FullData"),
            Self::Literal(domain) => f.debug_tuple("Literal").field(domain).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Data and declarations the host hands to the engine.
///
/// `series_name` identifies the dataset: a new name means a different series
/// and forces a full reset instead of an incremental update.
pub struct ChartProps<T> {
    pub series_name: String,
    pub data: Arc<[T]>,
    pub x_accessor: XAccessor<T>,
    /// Accessor used for labels; defaults to `x_accessor`.
    pub display_x_accessor: Option<XAccessor<T>>,
    pub x_extents: XExtents<T>,
    pub x_scale_kind: ScaleKind,
    pub panes: Vec<PaneDeclaration<T>>,
}

impl<T> ChartProps<T> {
    #[must_use]
    pub fn new(
        series_name: impl Into<String>,
        data: impl Into<Arc<[T]>>,
        x_accessor: XAccessor<T>,
    ) -> Self {
        Self {
            series_name: series_name.into(),
            data: data.into(),
            x_accessor,
            display_x_accessor: None,
            x_extents: XExtents::FullData,
            x_scale_kind: ScaleKind::Linear,
            panes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_x_extents(mut self, x_extents: XExtents<T>) -> Self {
        self.x_extents = x_extents;
        self
    }

    #[must_use]
    pub fn with_x_scale_kind(mut self, kind: ScaleKind) -> Self {
        self.x_scale_kind = kind;
        self
    }

    #[must_use]
    pub fn with_display_x_accessor(mut self, accessor: XAccessor<T>) -> Self {
        self.display_x_accessor = Some(accessor);
        self
    }

    #[must_use]
    pub fn with_pane(mut self, pane: PaneDeclaration<T>) -> Self {
        self.panes.push(pane);
        self
    }

    /// Same props with a replaced dataset, as used for appends.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Arc<[T]>>) -> Self {
        self.data = data.into();
        self
    }
}

impl<T> Clone for ChartProps<T> {
    fn clone(&self) -> Self {
        Self {
            series_name: self.series_name.clone(),
            data: Arc::clone(&self.data),
            x_accessor: self.x_accessor.clone(),
            display_x_accessor: self.display_x_accessor.clone(),
            x_extents: self.x_extents.clone(),
            x_scale_kind: self.x_scale_kind,
            panes: self.panes.clone(),
        }
    }
}

impl<T> fmt::Debug for ChartProps<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartProps")
            .field("series_name", &self.series_name)
            .field("data_len", &self.data.len())
            .field("x_extents", &self.x_extents)
            .field("x_scale_kind", &self.x_scale_kind)
            .field("panes", &self.panes)
            .finish_non_exhaustive()
    }
}
