use serde::{Deserialize, Serialize};

use crate::core::{Domain, PaneConfig, PlotDatum, Viewport};
use crate::interaction::{GesturePhase, MutableInteractionState};
use crate::render::LayeredSurface;

use super::{ChartEngine, CursorSlot, ReconcilePhase, RedrawStats, SubscriberId};

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    pub viewport: Viewport,
    pub series_name: String,
    pub x_domain: Domain,
    pub x_range: (f64, f64),
    /// Half-open row range of the visible window.
    pub plot_range: (usize, usize),
    pub full_len: usize,
    pub panes: Vec<PaneConfig>,
    pub gesture: GesturePhase,
    pub reconcile: ReconcilePhase,
    pub interaction: MutableInteractionState,
    pub cursor: CursorSlot,
    pub subscribers: Vec<SubscriberId>,
    pub redraw: RedrawStats,
}

impl<T: PlotDatum, S: LayeredSurface> ChartEngine<T, S> {
    #[must_use]
    pub fn snapshot(&self) -> ViewportSnapshot {
        let state = self.controller.state();
        let plot_range = state.plot_range();
        ViewportSnapshot {
            viewport: state.viewport(),
            series_name: self.controller.series_name().to_owned(),
            x_domain: state.x_domain(),
            x_range: state.x_scale().range(),
            plot_range: (plot_range.start, plot_range.end),
            full_len: state.full_data().len(),
            panes: state.panes().to_vec(),
            gesture: self.gesture.phase(),
            reconcile: self.controller.phase(),
            interaction: self.interaction.clone(),
            cursor: self.cursor,
            subscribers: self.registry.ids().collect(),
            redraw: self.scheduler.stats(),
        }
    }
}
