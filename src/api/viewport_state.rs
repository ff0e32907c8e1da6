use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::core::{Domain, PaneConfig, PaneId, Scale, Viewport, Window, XAccessor};

/// Everything derived from the current x-domain.
///
/// Built by the controller and replaced wholesale; readers never see a
/// partially updated state.
pub struct ViewportState<T> {
    pub(super) viewport: Viewport,
    pub(super) full_data: Arc<[T]>,
    pub(super) plot_range: Range<usize>,
    pub(super) x_scale: Scale,
    pub(super) x_accessor: XAccessor<T>,
    pub(super) display_x_accessor: XAccessor<T>,
    pub(super) panes: Vec<PaneConfig>,
}

impl<T> ViewportState<T> {
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn full_data(&self) -> &[T] {
        &self.full_data
    }

    /// Visible rows; always a slice of [`Self::full_data`].
    #[must_use]
    pub fn plot_data(&self) -> &[T] {
        self.full_data
            .get(self.plot_range.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn plot_range(&self) -> Range<usize> {
        self.plot_range.clone()
    }

    #[must_use]
    pub fn x_scale(&self) -> &Scale {
        &self.x_scale
    }

    #[must_use]
    pub fn x_domain(&self) -> Domain {
        self.x_scale.domain()
    }

    #[must_use]
    pub fn x_accessor(&self) -> &XAccessor<T> {
        &self.x_accessor
    }

    #[must_use]
    pub fn display_x_accessor(&self) -> &XAccessor<T> {
        &self.display_x_accessor
    }

    #[must_use]
    pub fn panes(&self) -> &[PaneConfig] {
        &self.panes
    }

    #[must_use]
    pub fn pane(&self, id: PaneId) -> Option<&PaneConfig> {
        self.panes.iter().find(|pane| pane.id == id)
    }

    #[must_use]
    pub fn first_x(&self) -> Option<f64> {
        self.full_data.first().map(|row| self.x_accessor.value(row))
    }

    #[must_use]
    pub fn last_x(&self) -> Option<f64> {
        self.full_data.last().map(|row| self.x_accessor.value(row))
    }

    pub(super) fn window(&self) -> Window {
        Window {
            range: self.plot_range.clone(),
            domain: self.x_scale.domain(),
        }
    }
}

impl<T> Clone for ViewportState<T> {
    fn clone(&self) -> Self {
        Self {
            viewport: self.viewport,
            full_data: Arc::clone(&self.full_data),
            plot_range: self.plot_range.clone(),
            x_scale: self.x_scale,
            x_accessor: self.x_accessor.clone(),
            display_x_accessor: self.display_x_accessor.clone(),
            panes: self.panes.clone(),
        }
    }
}

impl<T> fmt::Debug for ViewportState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportState")
            .field("viewport", &self.viewport)
            .field("full_len", &self.full_data.len())
            .field("plot_range", &self.plot_range)
            .field("x_scale", &self.x_scale)
            .field("panes", &self.panes)
            .finish_non_exhaustive()
    }
}
