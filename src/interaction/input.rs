use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }

    #[must_use]
    pub const fn contains(self, modifier: ModifierKey) -> bool {
        match modifier {
            ModifierKey::Shift => self.shift,
            ModifierKey::Ctrl => self.ctrl,
            ModifierKey::Alt => self.alt,
            ModifierKey::Meta => self.meta,
        }
    }
}

/// Single modifier key, used to configure the wheel-zoom gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
    Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Char(char),
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub id: u64,
    pub position: Point,
}

impl Touch {
    #[must_use]
    pub const fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

pub type Touches = SmallVec<[Touch; 2]>;

/// Raw host input in chart-area coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        position: Point,
        modifiers: Modifiers,
    },
    PointerUp {
        position: Point,
        button: PointerButton,
    },
    Click {
        position: Point,
        button: PointerButton,
    },
    DoubleClick {
        position: Point,
    },
    ContextMenu {
        position: Point,
    },
    PointerEnter {
        position: Point,
    },
    PointerLeave,
    /// Wheel deltas in pixels.
    Wheel {
        position: Point,
        delta_x: f64,
        delta_y: f64,
        modifiers: Modifiers,
    },
    TouchStart {
        touches: Touches,
    },
    TouchMove {
        touches: Touches,
    },
    /// `touches` lists the contacts still down.
    TouchEnd {
        touches: Touches,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
    Cancel,
}

impl InputEvent {
    #[must_use]
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            position: Point::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::none(),
        }
    }

    #[must_use]
    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            position: Point::new(x, y),
            modifiers: Modifiers::none(),
        }
    }

    #[must_use]
    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            position: Point::new(x, y),
            button: PointerButton::Primary,
        }
    }

    #[must_use]
    pub fn wheel(x: f64, y: f64, delta_x: f64, delta_y: f64) -> Self {
        Self::Wheel {
            position: Point::new(x, y),
            delta_x,
            delta_y,
            modifiers: Modifiers::none(),
        }
    }
}
