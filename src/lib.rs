//! chart-viewport: viewport, interaction and redraw engine for 2-D charts.
//!
//! The crate owns the x-domain, the visible data window, the pane layout and
//! the gesture state machine of an interactive chart. Drawing stays with the
//! host: subscribers paint onto a [`render::LayeredSurface`] when the engine
//! schedules a redraw pass.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig, ChartProps, Subscriber, SubscriberId};
pub use error::{ChartError, ChartResult};
