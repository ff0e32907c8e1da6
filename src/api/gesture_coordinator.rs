use std::mem;

use tracing::{debug, trace};

use crate::core::{PlotDatum, Point, closest_index, panes_at};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    DragSession, GestureState, InputEvent, Key, Modifiers, PanAnchor, PinchAnchor, PointerButton,
    Touch,
};
use crate::render::LayeredSurface;

use super::validation::validate_point;
use super::{ChartEngine, ChartEvent, ChartEventKind, DataRequests, EventDetail, ZoomDirection};

/// Work found pending at frame start, applied once the gesture borrow ends.
enum FrameStep {
    Nothing,
    Panned {
        position: Point,
        offset: Point,
        from_wheel: bool,
        requests: DataRequests,
    },
    Dragged {
        session: DragSession,
    },
    Pinched {
        requests: DataRequests,
    },
    WheelPanSettled,
}

pub(super) struct GestureCoordinator;

impl GestureCoordinator {
    pub(super) fn handle<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        event: InputEvent,
    ) -> ChartResult<()> {
        match event {
            InputEvent::PointerDown {
                position, button, ..
            } => Self::pointer_down(engine, validate_point(position, "pointer position")?, button),
            InputEvent::PointerMove { position, .. } => {
                Self::pointer_move(engine, validate_point(position, "pointer position")?);
                Ok(())
            }
            InputEvent::PointerUp { position, button } => {
                Self::pointer_up(engine, validate_point(position, "pointer position")?, button)
            }
            InputEvent::Click { position, button } => {
                let position = validate_point(position, "click position")?;
                Self::track_pointer(engine, position);
                engine.publish(ChartEvent::new(
                    ChartEventKind::Click,
                    Some(position),
                    EventDetail::Button(button),
                ));
                Ok(())
            }
            InputEvent::DoubleClick { position } => {
                let position = validate_point(position, "click position")?;
                Self::track_pointer(engine, position);
                engine.publish(ChartEvent::at(ChartEventKind::DoubleClick, position));
                Ok(())
            }
            InputEvent::ContextMenu { position } => {
                let position = validate_point(position, "context menu position")?;
                Self::track_pointer(engine, position);
                engine.publish(ChartEvent::at(ChartEventKind::ContextMenu, position));
                Ok(())
            }
            InputEvent::PointerEnter { position } => {
                let position = validate_point(position, "pointer position")?;
                Self::track_pointer(engine, position);
                engine.publish(ChartEvent::at(ChartEventKind::MouseEnter, position));
                Ok(())
            }
            InputEvent::PointerLeave => {
                engine.pending_mouse_move = None;
                engine.interaction.on_pointer_leave();
                engine.publish(ChartEvent::bare(ChartEventKind::MouseLeave));
                Ok(())
            }
            InputEvent::Wheel {
                position,
                delta_x,
                delta_y,
                modifiers,
            } => Self::wheel(
                engine,
                validate_point(position, "wheel position")?,
                delta_x,
                delta_y,
                modifiers,
            ),
            InputEvent::TouchStart { touches } => {
                validate_touches(&touches)?;
                Self::touch_start(engine, &touches)
            }
            InputEvent::TouchMove { touches } => {
                validate_touches(&touches)?;
                Self::touch_move(engine, &touches);
                Ok(())
            }
            InputEvent::TouchEnd { touches } => {
                validate_touches(&touches)?;
                Self::touch_end(engine)
            }
            InputEvent::KeyDown { key, modifiers } => {
                engine.publish(ChartEvent::new(
                    ChartEventKind::KeyDown,
                    None,
                    EventDetail::Key { key, modifiers },
                ));
                if key == Key::Escape {
                    Self::cancel(engine);
                }
                Ok(())
            }
            InputEvent::Cancel => {
                Self::cancel(engine);
                Ok(())
            }
        }
    }

    fn pointer_down<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        position: Point,
        button: PointerButton,
    ) -> ChartResult<()> {
        Self::settle_wheel_pan(engine)?;
        engine.pending_mouse_move = None;
        Self::track_pointer(engine, position);
        engine.publish(ChartEvent::new(
            ChartEventKind::MouseDown,
            Some(position),
            EventDetail::Button(button),
        ));
        if button == PointerButton::Primary && engine.gesture.is_idle() {
            Self::begin_press(engine, position);
        }
        Ok(())
    }

    /// Resolves a primary press into a drag, a pan or nothing.
    fn begin_press<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        position: Point,
    ) {
        let hovered = engine.interaction.hovered_panes.clone();
        if let Some(owner) = engine.registry.drag_claimant(&hovered) {
            let session = DragSession {
                owner,
                start: position,
                last: position,
                pending: None,
            };
            debug!(%owner, "drag started");
            engine.gesture = GestureState::Dragging(session);
            engine.publish(drag_event(ChartEventKind::DragStart, session));
            return;
        }
        if !engine.config().pan_event || !engine.registry.pan_allowed() {
            trace!("press ignored, panning disabled");
            return;
        }
        Self::start_pan(engine, position);
        debug!(x = position.x, y = position.y, "pan started");
    }

    fn start_pan<T: PlotDatum, S: LayeredSurface>(engine: &mut ChartEngine<T, S>, origin: Point) {
        let state = engine.controller.state();
        let anchor = PanAnchor::new(
            origin,
            *state.x_scale(),
            state.panes().to_vec(),
            engine.interaction.hovered_panes.clone(),
        );
        engine.gesture_origin = Some(state.clone());
        engine.gesture = GestureState::Panning(anchor);
    }

    fn pointer_move<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        position: Point,
    ) {
        match &mut engine.gesture {
            GestureState::Panning(anchor) if !anchor.from_wheel => {
                anchor.latest = position;
                anchor.pending = Some(position);
                return;
            }
            GestureState::Dragging(session) => {
                session.pending = Some(position);
                return;
            }
            GestureState::PinchZooming(_) => return,
            GestureState::Idle | GestureState::Panning(_) => {}
        }
        if engine.config().mouse_move_event {
            engine.pending_mouse_move = Some(position);
        }
    }

    fn pointer_up<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        position: Point,
        button: PointerButton,
    ) -> ChartResult<()> {
        engine.publish(ChartEvent::new(
            ChartEventKind::MouseUp,
            Some(position),
            EventDetail::Button(button),
        ));
        if button != PointerButton::Primary {
            return Ok(());
        }
        match mem::take(&mut engine.gesture) {
            GestureState::Panning(anchor) if !anchor.from_wheel => {
                Self::finish_pan(engine, &anchor, position)
            }
            GestureState::Dragging(session) => {
                Self::finish_drag(engine, session, position);
                Ok(())
            }
            other => {
                trace!(phase = ?other.phase(), "pointer up without a pointer gesture");
                engine.gesture = other;
                Ok(())
            }
        }
    }

    /// Applies the exact final position, then publishes `PanEnd`.
    fn finish_pan<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        anchor: &PanAnchor,
        position: Point,
    ) -> ChartResult<()> {
        let applied = engine.controller.apply_pan(anchor, position);
        engine.gesture_origin = None;
        let requests = applied?;
        if !anchor.from_wheel {
            Self::track_pointer(engine, position);
        }
        let offset = position.offset_from(anchor.origin);
        debug!(dx = offset.x, dy = offset.y, "pan ended");
        engine.publish(ChartEvent::new(
            ChartEventKind::PanEnd,
            Some(position),
            EventDetail::Pan {
                dx: offset.x,
                dy: offset.y,
            },
        ));
        engine.dispatch_data_requests(requests);
        Ok(())
    }

    fn finish_drag<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        session: DragSession,
        position: Point,
    ) {
        let session = DragSession {
            last: position,
            pending: None,
            ..session
        };
        Self::track_pointer(engine, position);
        debug!(owner = %session.owner, "drag ended");
        engine.publish(drag_event(ChartEventKind::DragEnd, session));
    }

    fn wheel<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        position: Point,
        delta_x: f64,
        delta_y: f64,
        modifiers: Modifiers,
    ) -> ChartResult<()> {
        if !delta_x.is_finite() || !delta_y.is_finite() {
            return Err(ChartError::InvalidData(
                "wheel deltas must be finite".to_owned(),
            ));
        }
        if delta_x == 0.0 && delta_y == 0.0 {
            return Ok(());
        }
        let config = engine.config();
        let (zoom_event, pan_event) = (config.zoom_event, config.pan_event);
        let zoom_gate = config
            .wheel_zoom_modifier
            .is_none_or(|key| modifiers.contains(key));
        let vertical = delta_y.abs() >= delta_x.abs();

        if vertical && zoom_gate && zoom_event {
            Self::settle_wheel_pan(engine)?;
            Self::track_pointer(engine, position);
            let direction = if delta_y > 0.0 {
                ZoomDirection::Out
            } else {
                ZoomDirection::In
            };
            return engine.zoom(direction, position);
        }
        if !pan_event {
            trace!("wheel ignored, panning disabled");
            return Ok(());
        }

        let delta = if vertical { delta_y } else { delta_x };
        let started = engine.gesture.is_idle();
        if started {
            if !engine.registry.pan_allowed() {
                trace!("wheel pan vetoed by a subscriber");
                return Ok(());
            }
            Self::track_pointer(engine, position);
            Self::start_pan(engine, position);
            trace!("wheel pan started");
        }
        match &mut engine.gesture {
            GestureState::Panning(anchor) if anchor.from_wheel || started => {
                anchor.from_wheel = true;
                anchor.latest.x -= delta;
                anchor.pending = Some(anchor.latest);
                anchor.last_wheel_ms = None;
            }
            other => trace!(phase = ?other.phase(), "wheel pan ignored during gesture"),
        }
        Ok(())
    }

    /// Ends an active wheel pan right away.
    fn settle_wheel_pan<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
    ) -> ChartResult<()> {
        match mem::take(&mut engine.gesture) {
            GestureState::Panning(anchor) if anchor.from_wheel => {
                Self::finish_pan(engine, &anchor, anchor.latest)
            }
            other => {
                engine.gesture = other;
                Ok(())
            }
        }
    }

    fn touch_start<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        touches: &[Touch],
    ) -> ChartResult<()> {
        match touches {
            [] => Ok(()),
            [single] => Self::pointer_down(engine, single.position, PointerButton::Primary),
            [first, second, ..] => {
                match mem::take(&mut engine.gesture) {
                    GestureState::Dragging(session) => {
                        trace!(owner = %session.owner, "second touch ignored while dragging");
                        engine.gesture = GestureState::Dragging(session);
                        return Ok(());
                    }
                    GestureState::Idle => {
                        engine.gesture_origin = Some(engine.controller.state().clone());
                    }
                    GestureState::Panning(_) | GestureState::PinchZooming(_) => {}
                }
                let pinch = PinchAnchor {
                    start_x_scale: *engine.controller.state().x_scale(),
                    touch_ids: (first.id, second.id),
                    touch_start: (first.position, second.position),
                    latest: (first.position, second.position),
                    pending: false,
                };
                debug!(first = first.id, second = second.id, "pinch started");
                engine.gesture = GestureState::PinchZooming(pinch);
                Ok(())
            }
        }
    }

    fn touch_move<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        touches: &[Touch],
    ) {
        if let GestureState::PinchZooming(pinch) = &mut engine.gesture {
            let find = |id: u64| touches.iter().find(|touch| touch.id == id);
            match (find(pinch.touch_ids.0), find(pinch.touch_ids.1)) {
                (Some(first), Some(second)) => {
                    pinch.latest = (first.position, second.position);
                    pinch.pending = true;
                }
                _ => trace!("pinch move without both tracked touches"),
            }
            return;
        }
        if let Some(touch) = touches.first() {
            Self::pointer_move(engine, touch.position);
        }
    }

    fn touch_end<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
    ) -> ChartResult<()> {
        match mem::take(&mut engine.gesture) {
            GestureState::PinchZooming(pinch) => Self::finish_pinch(engine, &pinch),
            GestureState::Panning(anchor) if !anchor.from_wheel => {
                Self::finish_pan(engine, &anchor, anchor.latest)
            }
            GestureState::Dragging(session) => {
                let position = session.pending.unwrap_or(session.last);
                Self::finish_drag(engine, session, position);
                Ok(())
            }
            other => {
                engine.gesture = other;
                Ok(())
            }
        }
    }

    /// Commits a pinch step not yet applied by a frame, then ends the pan.
    fn finish_pinch<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        pinch: &PinchAnchor,
    ) -> ChartResult<()> {
        let applied = if pinch.pending {
            engine.controller.apply_pinch(pinch, pinch.latest)
        } else {
            Ok(None)
        };
        engine.gesture_origin = None;
        if let Some(requests) = applied? {
            engine.publish(ChartEvent::bare(ChartEventKind::PinchZoom));
            engine.dispatch_data_requests(requests);
        }
        debug!("pinch ended");
        engine.publish(ChartEvent::bare(ChartEventKind::PanEnd));
        Ok(())
    }

    /// Drops the active gesture. Pans and pinches put the viewport back where
    /// the gesture found it.
    fn cancel<T: PlotDatum, S: LayeredSurface>(engine: &mut ChartEngine<T, S>) {
        match mem::take(&mut engine.gesture) {
            GestureState::Panning(_) | GestureState::PinchZooming(_) => {
                if let Some(origin) = engine.gesture_origin.take() {
                    engine.controller.restore(origin);
                }
                debug!("gesture cancelled, viewport restored");
                engine.publish(ChartEvent::bare(ChartEventKind::PanEnd));
            }
            GestureState::Dragging(session) => {
                debug!(owner = %session.owner, "drag cancelled");
                engine.publish(drag_event(ChartEventKind::DragCancel, session));
            }
            GestureState::Idle => trace!("cancel without an active gesture"),
        }
    }

    /// Applies the latest input gathered since the previous frame.
    pub(super) fn flush_pending<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        timestamp_ms: f64,
    ) -> ChartResult<()> {
        if let Some(position) = engine.pending_mouse_move.take() {
            Self::track_pointer(engine, position);
            engine.publish(ChartEvent::at(ChartEventKind::MouseMove, position));
        }

        let debounce_ms = engine.controller.config().wheel_pan_end_debounce_ms;
        let step = match &mut engine.gesture {
            GestureState::Panning(anchor) => {
                if let Some(position) = anchor.pending.take() {
                    let requests = engine.controller.apply_pan(anchor, position)?;
                    FrameStep::Panned {
                        position,
                        offset: position.offset_from(anchor.origin),
                        from_wheel: anchor.from_wheel,
                        requests,
                    }
                } else if anchor.from_wheel {
                    match anchor.last_wheel_ms {
                        None => {
                            anchor.last_wheel_ms = Some(timestamp_ms);
                            FrameStep::Nothing
                        }
                        Some(last) if timestamp_ms - last >= debounce_ms => {
                            FrameStep::WheelPanSettled
                        }
                        Some(_) => FrameStep::Nothing,
                    }
                } else {
                    FrameStep::Nothing
                }
            }
            GestureState::Dragging(session) => match session.pending.take() {
                Some(position) => {
                    session.last = position;
                    FrameStep::Dragged { session: *session }
                }
                None => FrameStep::Nothing,
            },
            GestureState::PinchZooming(pinch) if pinch.pending => {
                pinch.pending = false;
                match engine.controller.apply_pinch(pinch, pinch.latest)? {
                    Some(requests) => FrameStep::Pinched { requests },
                    None => FrameStep::Nothing,
                }
            }
            GestureState::PinchZooming(_) | GestureState::Idle => FrameStep::Nothing,
        };

        match step {
            FrameStep::Nothing => {}
            FrameStep::Panned {
                position,
                offset,
                from_wheel,
                requests,
            } => {
                if !from_wheel {
                    Self::track_pointer(engine, position);
                }
                trace!(dx = offset.x, dy = offset.y, "pan applied");
                engine.publish(ChartEvent::new(
                    ChartEventKind::Pan,
                    Some(position),
                    EventDetail::Pan {
                        dx: offset.x,
                        dy: offset.y,
                    },
                ));
                engine.dispatch_data_requests(requests);
            }
            FrameStep::Dragged { session } => {
                Self::track_pointer(engine, session.last);
                engine.publish(drag_event(ChartEventKind::Drag, session));
            }
            FrameStep::Pinched { requests } => {
                engine.publish(ChartEvent::bare(ChartEventKind::PinchZoom));
                engine.dispatch_data_requests(requests);
            }
            FrameStep::WheelPanSettled => {
                trace!(debounce_ms, "wheel pan settled");
                Self::settle_wheel_pan(engine)?;
            }
        }
        Ok(())
    }

    /// Updates mouse, hovered panes and the closest row for `position`.
    fn track_pointer<T: PlotDatum, S: LayeredSurface>(
        engine: &mut ChartEngine<T, S>,
        position: Point,
    ) {
        let state = engine.controller.state();
        let hovered = panes_at(state.panes(), position.y);
        let value = state.x_scale().invert(position.x);
        let current_item = closest_index(state.plot_data(), state.x_accessor(), value)
            .map(|index| index + state.plot_range().start);
        engine.interaction.on_pointer_move(position, hovered);
        engine.interaction.current_item = current_item;
    }
}

fn drag_event(kind: ChartEventKind, session: DragSession) -> ChartEvent {
    ChartEvent::new(
        kind,
        Some(session.last),
        EventDetail::Drag {
            owner: session.owner,
            start: session.start,
            delta: session.delta(),
        },
    )
}

fn validate_touches(touches: &[Touch]) -> ChartResult<()> {
    for touch in touches {
        validate_point(touch.position, "touch position")?;
    }
    Ok(())
}
