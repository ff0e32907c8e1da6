mod input;
mod pinch;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::api::SubscriberId;
use crate::core::{PaneConfig, PaneId, Point, Scale};

pub use input::{InputEvent, Key, ModifierKey, Modifiers, PointerButton, Touch, Touches};
pub use pinch::solve_pinch_domain;

/// Serializable summary of the active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Panning,
    Dragging,
    PinchZooming,
}

/// What a subscriber currently allows for the pointer under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanConditions {
    /// The subscriber wants pointer-down to start a drag it owns.
    pub draggable: bool,
    /// The subscriber lets the chart pan underneath it.
    pub pan_enabled: bool,
}

impl Default for PanConditions {
    fn default() -> Self {
        Self {
            draggable: false,
            pan_enabled: true,
        }
    }
}

/// State captured when a pan starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PanAnchor {
    pub origin: Point,
    /// Last known pointer position, applied or not.
    pub latest: Point,
    pub start_x_scale: Scale,
    pub start_panes: Vec<PaneConfig>,
    /// Panes under the pointer at pan start; only these follow vertical drag.
    pub panes_to_pan: SmallVec<[PaneId; 4]>,
    /// Position not yet applied by a frame.
    pub pending: Option<Point>,
    /// `true` for wheel-driven pans that end on a debounce timer.
    pub from_wheel: bool,
    pub last_wheel_ms: Option<f64>,
}

impl PanAnchor {
    #[must_use]
    pub fn new(
        origin: Point,
        start_x_scale: Scale,
        start_panes: Vec<PaneConfig>,
        panes_to_pan: SmallVec<[PaneId; 4]>,
    ) -> Self {
        Self {
            origin,
            latest: origin,
            start_x_scale,
            start_panes,
            panes_to_pan,
            pending: None,
            from_wheel: false,
            last_wheel_ms: None,
        }
    }
}

/// State captured when two touches go down.
#[derive(Debug, Clone, PartialEq)]
pub struct PinchAnchor {
    pub start_x_scale: Scale,
    pub touch_ids: (u64, u64),
    pub touch_start: (Point, Point),
    pub latest: (Point, Point),
    pub pending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub owner: SubscriberId,
    pub start: Point,
    pub last: Point,
    pub pending: Option<Point>,
}

impl DragSession {
    #[must_use]
    pub fn delta(&self) -> Point {
        self.last.offset_from(self.start)
    }
}

/// Gesture state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Panning(PanAnchor),
    Dragging(DragSession),
    PinchZooming(PinchAnchor),
}

impl GestureState {
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        match self {
            Self::Idle => GesturePhase::Idle,
            Self::Panning(_) => GesturePhase::Panning,
            Self::Dragging(_) => GesturePhase::Dragging,
            Self::PinchZooming(_) => GesturePhase::PinchZooming,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Transient pointer state shared with subscribers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MutableInteractionState {
    pub mouse: Point,
    pub prev_mouse: Point,
    pub hovered_panes: SmallVec<[PaneId; 4]>,
    /// Index into the full dataset of the row closest to the pointer.
    pub current_item: Option<usize>,
    /// `false` once the pointer left the chart.
    pub show: bool,
}

impl MutableInteractionState {
    pub fn on_pointer_move(&mut self, position: Point, hovered_panes: SmallVec<[PaneId; 4]>) {
        self.prev_mouse = self.mouse;
        self.mouse = position;
        self.hovered_panes = hovered_panes;
        self.show = true;
    }

    pub fn on_pointer_leave(&mut self) {
        self.show = false;
        self.hovered_panes.clear();
        self.current_item = None;
    }

    #[must_use]
    pub fn hovers(&self, pane: PaneId) -> bool {
        self.hovered_panes.contains(&pane)
    }
}
