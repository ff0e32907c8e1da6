use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::render::{CanvasLayerKind, LayerMask};

use super::{ChartEventKind, DrawCategories, DrawCategory};

/// What caused a redraw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DrawTrigger {
    categories: DrawCategories,
    reset: bool,
}

impl DrawTrigger {
    #[must_use]
    pub const fn reset() -> Self {
        Self {
            categories: DrawCategories::all(),
            reset: true,
        }
    }

    #[must_use]
    pub const fn for_category(category: DrawCategory) -> Self {
        Self {
            categories: DrawCategories::from_category(category),
            reset: false,
        }
    }

    #[must_use]
    pub const fn for_event(kind: ChartEventKind) -> Self {
        Self::for_category(kind.draw_category())
    }

    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            categories: self.categories.union(other.categories),
            reset: self.reset || other.reset,
        }
    }

    #[must_use]
    pub const fn categories(self) -> DrawCategories {
        self.categories
    }

    #[must_use]
    pub const fn is_reset(self) -> bool {
        self.reset
    }

    /// `true` when a subscriber that redraws on `draw_on` must repaint.
    #[must_use]
    pub const fn concerns(self, draw_on: DrawCategories) -> bool {
        self.reset || self.categories.intersects(draw_on)
    }

    /// Layers wiped before the pass.
    #[must_use]
    pub fn clear_mask(self) -> LayerMask {
        if self.reset {
            return LayerMask::all();
        }
        let mut mask = LayerMask::none();
        if !self.categories.is_none() {
            mask = mask.with_layer(CanvasLayerKind::MouseCoord);
        }
        if self.categories.contains(DrawCategory::Pan) {
            mask = mask.with_layer(CanvasLayerKind::Axes);
        }
        mask
    }
}

/// Coalesces draw requests into at most one pass per frame.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: Option<DrawTrigger>,
    requests: u64,
    passes: u64,
}

impl RedrawScheduler {
    pub fn request(&mut self, trigger: DrawTrigger) {
        self.requests += 1;
        let merged = match self.pending {
            Some(pending) => pending.merge(trigger),
            None => trigger,
        };
        trace!(reset = merged.is_reset(), "redraw requested");
        self.pending = Some(merged);
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending(&self) -> Option<DrawTrigger> {
        self.pending
    }

    /// Removes the merged trigger for the pass about to run.
    pub fn take_pending(&mut self) -> Option<DrawTrigger> {
        let trigger = self.pending.take()?;
        self.passes += 1;
        Some(trigger)
    }

    #[must_use]
    pub fn stats(&self) -> RedrawStats {
        RedrawStats {
            requests: self.requests,
            passes: self.passes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RedrawStats {
    pub requests: u64,
    pub passes: u64,
}
