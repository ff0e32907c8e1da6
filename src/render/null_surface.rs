use crate::error::ChartResult;
use crate::render::{CanvasLayerKind, LayeredSurface};

/// Surface that only records which layers were cleared.
///
/// Used by tests and headless engine usage.
#[derive(Debug, Default)]
pub struct NullSurface {
    pub cleared: Vec<CanvasLayerKind>,
}

impl NullSurface {
    /// Returns and forgets the clears recorded so far.
    pub fn take_cleared(&mut self) -> Vec<CanvasLayerKind> {
        std::mem::take(&mut self.cleared)
    }
}

impl LayeredSurface for NullSurface {
    fn clear_layer(&mut self, layer: CanvasLayerKind) -> ChartResult<()> {
        self.cleared.push(layer);
        Ok(())
    }
}
