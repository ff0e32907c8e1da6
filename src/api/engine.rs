use tracing::{debug, trace};

use crate::core::{Domain, PaneId, PlotDatum, Point, Viewport};
use crate::error::ChartResult;
use crate::interaction::{GesturePhase, GestureState, InputEvent, MutableInteractionState};
use crate::render::LayeredSurface;

use super::gesture_coordinator::GestureCoordinator;
use super::validation::validate_point;
use super::{
    ChartEngineConfig, ChartEvent, ChartEventKind, ChartProps, CursorSlot, CursorStyle,
    DataRequest, DataRequests, DrawCategory, DrawTrigger, EventDetail, MoreProps,
    ReconcilePhase, RedrawScheduler, RedrawStats, Subscriber, SubscriberId,
    SubscriptionRegistry, ViewportController, ViewportState, ZoomDirection,
};

pub type DataRequestHandler = Box<dyn FnMut(DataRequest)>;

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns the viewport controller, the gesture state machine,
/// the subscriber registry and the redraw scheduler. Hosts feed it raw input
/// through [`Self::handle_input`] and call [`Self::run_frame`] once per
/// animation frame.
pub struct ChartEngine<T, S: LayeredSurface> {
    pub(super) surface: S,
    pub(super) controller: ViewportController<T>,
    pub(super) registry: SubscriptionRegistry<T, S>,
    pub(super) scheduler: RedrawScheduler,
    pub(super) gesture: GestureState,
    /// State to restore when the active pan or pinch is cancelled.
    pub(super) gesture_origin: Option<ViewportState<T>>,
    pub(super) interaction: MutableInteractionState,
    pub(super) cursor: CursorSlot,
    pub(super) pending_mouse_move: Option<Point>,
    pub(super) data_request_handler: Option<DataRequestHandler>,
}

impl<T: PlotDatum, S: LayeredSurface> ChartEngine<T, S> {
    pub fn new(surface: S, config: ChartEngineConfig, props: ChartProps<T>) -> ChartResult<Self> {
        let controller = ViewportController::new(config, props)?;
        let mut scheduler = RedrawScheduler::default();
        scheduler.request(DrawTrigger::reset());
        Ok(Self {
            surface,
            controller,
            registry: SubscriptionRegistry::default(),
            scheduler,
            gesture: GestureState::Idle,
            gesture_origin: None,
            interaction: MutableInteractionState::default(),
            cursor: CursorSlot::default(),
            pending_mouse_move: None,
            data_request_handler: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ChartEngineConfig {
        self.controller.config()
    }

    pub fn set_config(&mut self, config: ChartEngineConfig) -> ChartResult<()> {
        self.abandon_gesture();
        self.controller.set_config(config)?;
        self.scheduler.request(DrawTrigger::reset());
        Ok(())
    }

    /// Replaces the chart props.
    ///
    /// A new series name, x-extent, scale kind or x-accessor resets the
    /// viewport; anything else (typically appended rows) goes through the
    /// incremental path that keeps the user's pan/zoom.
    pub fn set_props(&mut self, props: ChartProps<T>) -> ChartResult<()> {
        self.abandon_gesture();
        if self.controller.needs_reset(&props) {
            self.controller.reset_from_props(props)?;
        } else {
            self.controller.update_on_prop_change(props)?;
        }
        self.scheduler.request(DrawTrigger::reset());
        Ok(())
    }

    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.abandon_gesture();
        self.controller.resize(viewport)?;
        self.scheduler.request(DrawTrigger::reset());
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> &ViewportState<T> {
        self.controller.state()
    }

    #[must_use]
    pub fn controller(&self) -> &ViewportController<T> {
        &self.controller
    }

    #[must_use]
    pub fn interaction(&self) -> &MutableInteractionState {
        &self.interaction
    }

    #[must_use]
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    #[must_use]
    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    #[must_use]
    pub fn reconcile_phase(&self) -> ReconcilePhase {
        self.controller.phase()
    }

    #[must_use]
    pub fn cursor(&self) -> CursorSlot {
        self.cursor
    }

    /// Cursor the host should show: the subscriber override, else a grab
    /// cursor while panning.
    #[must_use]
    pub fn cursor_style(&self) -> CursorStyle {
        if let Some(style) = self.cursor.style() {
            return style;
        }
        match self.gesture.phase() {
            GesturePhase::Panning | GesturePhase::PinchZooming => CursorStyle::Grabbing,
            GesturePhase::Dragging => CursorStyle::Move,
            GesturePhase::Idle => CursorStyle::Default,
        }
    }

    pub fn subscribe(
        &mut self,
        id: SubscriberId,
        subscriber: impl Subscriber<T, S> + 'static,
    ) -> ChartResult<()> {
        self.registry.subscribe(id, Box::new(subscriber))
    }

    /// Unregisters a subscriber by id. Returns `true` when removed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        if let GestureState::Dragging(session) = &self.gesture
            && session.owner == id
        {
            debug!(%id, "drag owner unsubscribed, ending drag");
            self.gesture = GestureState::Idle;
        }
        self.registry.unsubscribe(id, &mut self.cursor)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn has_subscriber(&self, id: SubscriberId) -> bool {
        self.registry.contains(id)
    }

    #[must_use]
    pub fn is_on_top(&self, id: SubscriberId) -> bool {
        self.registry.is_on_top(id, &self.interaction)
    }

    /// Receives `Before`/`After` requests when the viewport crosses the
    /// loaded data.
    pub fn set_data_request_handler(&mut self, handler: impl FnMut(DataRequest) + 'static) {
        self.data_request_handler = Some(Box::new(handler));
    }

    pub fn handle_input(&mut self, event: InputEvent) -> ChartResult<()> {
        GestureCoordinator::handle(self, event)
    }

    /// Applies the input gathered since the previous frame and runs at most
    /// one redraw pass. Returns `true` when subscribers were drawn.
    pub fn run_frame(&mut self, timestamp_ms: f64) -> ChartResult<bool> {
        GestureCoordinator::flush_pending(self, timestamp_ms)?;
        self.draw_pending()
    }

    pub fn request_redraw(&mut self, trigger: DrawTrigger) {
        self.scheduler.request(trigger);
    }

    #[must_use]
    pub fn has_pending_redraw(&self) -> bool {
        self.scheduler.has_pending()
    }

    #[must_use]
    pub fn redraw_stats(&self) -> RedrawStats {
        self.scheduler.stats()
    }

    /// Moves the viewport to `domain`, keeping the current one when `domain`
    /// cannot be shown.
    pub fn zoom_to_domain(&mut self, domain: Domain) -> ChartResult<()> {
        let requests = self.controller.zoom_to_domain(domain)?;
        self.scheduler
            .request(DrawTrigger::for_category(DrawCategory::Pan));
        self.dispatch_data_requests(requests);
        Ok(())
    }

    /// One zoom step around the configured anchor.
    pub fn zoom(&mut self, direction: ZoomDirection, mouse: Point) -> ChartResult<()> {
        let mouse = validate_point(mouse, "zoom position")?;
        let anchor_x = self.controller.zoom_anchor_px(mouse);
        let factor = self.controller.zoom_factor(direction);
        let requests = self.controller.apply_zoom(anchor_x, factor)?;
        self.publish(ChartEvent::new(
            ChartEventKind::Zoom,
            Some(mouse),
            EventDetail::Zoom { anchor_x, factor },
        ));
        self.dispatch_data_requests(requests);
        Ok(())
    }

    pub fn set_pane_y_domain(&mut self, pane: PaneId, domain: Domain) -> ChartResult<()> {
        self.controller.set_pane_y_domain(pane, domain)?;
        self.scheduler
            .request(DrawTrigger::for_category(DrawCategory::Pan));
        Ok(())
    }

    pub fn zoom_pane_y(&mut self, pane: PaneId, anchor_y: f64, factor: f64) -> ChartResult<()> {
        self.controller.zoom_pane_y(pane, anchor_y, factor)?;
        self.scheduler
            .request(DrawTrigger::for_category(DrawCategory::Pan));
        Ok(())
    }

    /// Axis-drag zoom of `pane`'s y-axis, measured from `start_domain`.
    pub fn y_axis_drag(
        &mut self,
        pane: PaneId,
        start_domain: Domain,
        delta_px: f64,
    ) -> ChartResult<()> {
        if self.controller.y_axis_drag(pane, start_domain, delta_px)? {
            self.scheduler
                .request(DrawTrigger::for_category(DrawCategory::Pan));
        }
        Ok(())
    }

    pub fn reset_y_domain(&mut self, pane: PaneId) -> ChartResult<()> {
        self.controller.reset_y_domain(pane)?;
        self.scheduler
            .request(DrawTrigger::for_category(DrawCategory::Pan));
        Ok(())
    }

    pub fn reset_all_y_domains(&mut self) {
        self.controller.reset_all_y_domains();
        self.scheduler
            .request(DrawTrigger::for_category(DrawCategory::Pan));
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Fans `event` out, except owner-only drag events, which reach the drag
    /// owner named in their detail.
    pub(super) fn publish(&mut self, event: ChartEvent) {
        let state = self.controller.state();
        match event.detail {
            EventDetail::Drag { owner, .. } if event.kind.is_owner_only() => {
                self.registry
                    .deliver_to(owner, &event, state, &self.interaction, &mut self.cursor);
            }
            _ => self
                .registry
                .publish(&event, state, &self.interaction, &mut self.cursor),
        }
        self.scheduler.request(DrawTrigger::for_event(event.kind));
    }

    pub(super) fn dispatch_data_requests(&mut self, requests: DataRequests) {
        if requests.is_empty() {
            return;
        }
        let Some(handler) = self.data_request_handler.as_mut() else {
            trace!(count = requests.len(), "no data request handler installed");
            return;
        };
        for request in requests {
            handler(request);
        }
    }

    fn draw_pending(&mut self) -> ChartResult<bool> {
        let Some(trigger) = self.scheduler.take_pending() else {
            return Ok(false);
        };
        self.surface.clear_layers(trigger.clear_mask())?;
        let props = MoreProps::new(self.controller.state(), &self.interaction);
        self.registry.draw_all(trigger, &mut self.surface, &props)?;
        Ok(true)
    }

    /// Drops the active gesture without publishing, used when props or
    /// geometry are replaced under it.
    fn abandon_gesture(&mut self) {
        if !self.gesture.is_idle() {
            debug!(phase = ?self.gesture.phase(), "gesture abandoned by external update");
        }
        self.gesture = GestureState::Idle;
        self.gesture_origin = None;
    }
}
