mod layer_stack;
mod null_surface;

pub use layer_stack::{CanvasLayerKind, LayerMask};
pub use null_surface::NullSurface;

use crate::error::ChartResult;

/// Contract implemented by the host's drawing surface.
///
/// The engine only decides which layers to wipe before a redraw pass;
/// subscribers paint onto the surface themselves from `Subscriber::draw`.
pub trait LayeredSurface {
    fn clear_layer(&mut self, layer: CanvasLayerKind) -> ChartResult<()>;

    fn clear_layers(&mut self, mask: LayerMask) -> ChartResult<()> {
        for layer in mask.layers() {
            self.clear_layer(layer)?;
        }
        Ok(())
    }
}
