use serde::{Deserialize, Serialize};

/// Surface layers, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasLayerKind {
    Background,
    Axes,
    /// Cursor-following overlays (crosshair, hover tooltips, drag previews).
    MouseCoord,
}

impl CanvasLayerKind {
    pub const ALL: [Self; 3] = [Self::Background, Self::Axes, Self::MouseCoord];

    const fn bit(self) -> u8 {
        match self {
            Self::Background => 1 << 0,
            Self::Axes => 1 << 1,
            Self::MouseCoord => 1 << 2,
        }
    }
}

/// Set of layers cleared together before a redraw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LayerMask {
    bits: u8,
}

impl LayerMask {
    const ALL_BITS: u8 = CanvasLayerKind::Background.bit()
        | CanvasLayerKind::Axes.bit()
        | CanvasLayerKind::MouseCoord.bit();

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
    pub const fn from_layer(layer: CanvasLayerKind) -> Self {
        Self { bits: layer.bit() }
    }

    #[must_use]
    pub const fn with_layer(self, layer: CanvasLayerKind) -> Self {
        Self {
            bits: self.bits | layer.bit(),
        }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn contains(self, layer: CanvasLayerKind) -> bool {
        (self.bits & layer.bit()) != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }

    /// Layers in the mask, bottom to top.
    pub fn layers(self) -> impl Iterator<Item = CanvasLayerKind> {
        CanvasLayerKind::ALL
            .into_iter()
            .filter(move |layer| self.contains(*layer))
    }
}
