use serde::{Deserialize, Serialize};

use crate::core::Point;
use crate::interaction::{Key, Modifiers, PointerButton};

use super::SubscriberId;

/// Named events published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartEventKind {
    MouseMove,
    MouseEnter,
    MouseLeave,
    MouseDown,
    MouseUp,
    Click,
    DoubleClick,
    ContextMenu,
    KeyDown,
    Pan,
    PanEnd,
    Zoom,
    PinchZoom,
    DragStart,
    Drag,
    DragEnd,
    DragCancel,
}

impl ChartEventKind {
    /// Redraw category this event collapses to.
    #[must_use]
    pub const fn draw_category(self) -> DrawCategory {
        match self {
            Self::MouseMove
            | Self::MouseLeave
            | Self::MouseDown
            | Self::MouseUp
            | Self::Click
            | Self::DoubleClick
            | Self::ContextMenu => DrawCategory::MouseMove,
            Self::MouseEnter => DrawCategory::MouseEnter,
            Self::KeyDown => DrawCategory::KeyDown,
            Self::Pan | Self::PanEnd | Self::Zoom | Self::PinchZoom => DrawCategory::Pan,
            Self::DragStart | Self::Drag | Self::DragEnd | Self::DragCancel => DrawCategory::Drag,
        }
    }

    /// Events delivered to the drag owner only.
    #[must_use]
    pub const fn is_owner_only(self) -> bool {
        matches!(self, Self::DragStart | Self::Drag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawCategory {
    MouseMove,
    MouseEnter,
    Pan,
    Drag,
    KeyDown,
}

impl DrawCategory {
    const fn bit(self) -> u8 {
        match self {
            Self::MouseMove => 1 << 0,
            Self::MouseEnter => 1 << 1,
            Self::Pan => 1 << 2,
            Self::Drag => 1 << 3,
            Self::KeyDown => 1 << 4,
        }
    }
}

/// Bitmask of draw categories.
///
/// Subscribers declare the categories they redraw on; the scheduler merges the
/// categories of every event seen since the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DrawCategories {
    bits: u8,
}

impl DrawCategories {
    const ALL_BITS: u8 = DrawCategory::MouseMove.bit()
        | DrawCategory::MouseEnter.bit()
        | DrawCategory::Pan.bit()
        | DrawCategory::Drag.bit()
        | DrawCategory::KeyDown.bit();

    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            bits: Self::ALL_BITS,
        }
    }

    #[must_use]
    pub const fn from_category(category: DrawCategory) -> Self {
        Self {
            bits: category.bit(),
        }
    }

    #[must_use]
    pub const fn with_category(self, category: DrawCategory) -> Self {
        Self {
            bits: self.bits | category.bit(),
        }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    #[must_use]
    pub const fn contains(self, category: DrawCategory) -> bool {
        self.intersects(Self::from_category(category))
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

impl FromIterator<DrawCategory> for DrawCategories {
    fn from_iter<I: IntoIterator<Item = DrawCategory>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::none(), |categories, category| categories.with_category(category))
    }
}

/// Event-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum EventDetail {
    #[default]
    None,
    Button(PointerButton),
    /// Cumulative pixel offset from the gesture start.
    Pan { dx: f64, dy: f64 },
    /// Anchor pixel and the factor applied to range offsets around it.
    Zoom { anchor_x: f64, factor: f64 },
    Drag {
        owner: SubscriberId,
        start: Point,
        delta: Point,
    },
    Key { key: Key, modifiers: Modifiers },
}

/// Event handed to `Subscriber::listen`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartEvent {
    pub kind: ChartEventKind,
    /// Pointer position in chart-area pixels, when the event has one.
    pub position: Option<Point>,
    pub detail: EventDetail,
}

impl ChartEvent {
    #[must_use]
    pub const fn new(kind: ChartEventKind, position: Option<Point>, detail: EventDetail) -> Self {
        Self {
            kind,
            position,
            detail,
        }
    }

    #[must_use]
    pub const fn at(kind: ChartEventKind, position: Point) -> Self {
        Self::new(kind, Some(position), EventDetail::None)
    }

    #[must_use]
    pub const fn bare(kind: ChartEventKind) -> Self {
        Self::new(kind, None, EventDetail::None)
    }
}
