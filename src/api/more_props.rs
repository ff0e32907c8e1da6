use crate::core::{PaneConfig, PaneId, Point, Scale, Viewport, XAccessor};
use crate::interaction::MutableInteractionState;

use super::ViewportState;

/// Read-only snapshot handed to `Subscriber::draw`.
///
/// Scalars are owned so `Subscriber::decorate` can adjust them (for example
/// to draw against a shifted x-scale) without touching engine state.
pub struct MoreProps<'a, T> {
    pub viewport: Viewport,
    pub x_scale: Scale,
    pub x_accessor: &'a XAccessor<T>,
    pub display_x_accessor: &'a XAccessor<T>,
    pub plot_data: &'a [T],
    pub full_data: &'a [T],
    pub panes: &'a [PaneConfig],
    pub mouse: Point,
    pub hovered_panes: &'a [PaneId],
    pub current_item: Option<&'a T>,
    pub show: bool,
}

impl<'a, T> MoreProps<'a, T> {
    #[must_use]
    pub fn new(state: &'a ViewportState<T>, interaction: &'a MutableInteractionState) -> Self {
        Self {
            viewport: state.viewport(),
            x_scale: *state.x_scale(),
            x_accessor: state.x_accessor(),
            display_x_accessor: state.display_x_accessor(),
            plot_data: state.plot_data(),
            full_data: state.full_data(),
            panes: state.panes(),
            mouse: interaction.mouse,
            hovered_panes: &interaction.hovered_panes,
            current_item: interaction
                .current_item
                .and_then(|index| state.full_data().get(index)),
            show: interaction.show,
        }
    }

    #[must_use]
    pub fn pane(&self, id: PaneId) -> Option<&'a PaneConfig> {
        self.panes.iter().find(|pane| pane.id == id)
    }

    /// Mouse position relative to the origin of `pane`.
    #[must_use]
    pub fn mouse_in_pane(&self, pane: PaneId) -> Option<Point> {
        self.pane(pane)
            .map(|config| self.mouse.offset_from(config.origin))
    }
}

impl<T> Clone for MoreProps<'_, T> {
    fn clone(&self) -> Self {
        Self {
            viewport: self.viewport,
            x_scale: self.x_scale,
            x_accessor: self.x_accessor,
            display_x_accessor: self.display_x_accessor,
            plot_data: self.plot_data,
            full_data: self.full_data,
            panes: self.panes,
            mouse: self.mouse,
            hovered_panes: self.hovered_panes,
            current_item: self.current_item,
            show: self.show,
        }
    }
}
