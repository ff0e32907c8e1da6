mod boundary;
mod engine;
mod engine_config;
mod engine_snapshot;
mod event;
mod gesture_coordinator;
mod json_contract;
mod more_props;
mod props;
mod redraw_scheduler;
mod subscription_registry;
mod validation;
mod viewport_controller;
mod viewport_state;
mod zoom_anchor;

pub use boundary::{BoundaryTracker, DataRequest, DataRequests};
pub use engine::{ChartEngine, DataRequestHandler};
pub use engine_config::ChartEngineConfig;
pub use engine_snapshot::ViewportSnapshot;
pub use event::{ChartEvent, ChartEventKind, DrawCategories, DrawCategory, EventDetail};
pub use json_contract::{VIEWPORT_SNAPSHOT_JSON_SCHEMA_V1, ViewportSnapshotJsonContractV1};
pub use more_props::MoreProps;
pub use props::{ChartProps, XExtents, XExtentsFn};
pub use redraw_scheduler::{DrawTrigger, RedrawScheduler, RedrawStats};
pub use subscription_registry::{
    CursorSlot, CursorStyle, EventContext, Subscriber, SubscriberId, SubscriptionRegistry,
};
pub use viewport_controller::{ReconcilePhase, ViewportController, ZoomDirection};
pub use viewport_state::ViewportState;
pub use zoom_anchor::{ZoomAnchor, ZoomAnchorFn, ZoomAnchorInput};
