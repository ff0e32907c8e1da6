use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Point, Scale};

/// Inputs available to a zoom anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomAnchorInput {
    pub x_scale: Scale,
    pub mouse: Point,
    /// Index into the full data of the visible row nearest the pointer.
    pub mouse_item: Option<usize>,
    /// x value of that row.
    pub mouse_item_x: Option<f64>,
    /// x value of the last visible row, if any.
    pub last_visible_x: Option<f64>,
}

#[derive(Clone)]
pub struct ZoomAnchorFn(Arc<dyn Fn(&ZoomAnchorInput) -> f64 + Send + Sync>);

impl ZoomAnchorFn {
    pub fn new(anchor: impl Fn(&ZoomAnchorInput) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(anchor))
    }
}

impl fmt::Debug for ZoomAnchorFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ZoomAnchorFn(..)")
    }
}

impl PartialEq for ZoomAnchorFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Pixel that stays fixed while zooming.
///
/// `Mouse` and `LastVisibleItem` anchor on a row, so that row keeps its pixel
/// through the zoom. Both fall back to the raw pointer when no row is visible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ZoomAnchor {
    #[default]
    Mouse,
    LastVisibleItem,
    RightDomain,
    #[serde(skip)]
    Custom(ZoomAnchorFn),
}

impl ZoomAnchor {
    #[must_use]
    pub fn anchor_px(&self, input: &ZoomAnchorInput) -> f64 {
        match self {
            Self::Mouse => input
                .mouse_item_x
                .map_or(input.mouse.x, |x| input.x_scale.map(x)),
            Self::LastVisibleItem => input
                .last_visible_x
                .map_or(input.mouse.x, |x| input.x_scale.map(x)),
            Self::RightDomain => input.x_scale.map(input.x_scale.domain().end),
            Self::Custom(anchor) => (anchor.0)(input),
        }
    }
}
