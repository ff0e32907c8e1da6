use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use chart_viewport::api::{
    ChartEngine, ChartEngineConfig, ChartEvent, ChartEventKind, ChartProps, DataRequest,
    EventContext, EventDetail, Subscriber, SubscriberId, XExtents,
};
use chart_viewport::core::{Domain, PaneDeclaration, PaneId, Viewport, XAccessor, YExtents, YValue};
use chart_viewport::interaction::{GesturePhase, InputEvent, Key, ModifierKey, Modifiers};
use chart_viewport::render::NullSurface;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Row {
    x: f64,
    close: f64,
}

type Engine = ChartEngine<Row, NullSurface>;

const PRICE: PaneId = PaneId::new(1);

struct Recorder {
    events: Rc<RefCell<Vec<ChartEvent>>>,
}

impl<T, S> Subscriber<T, S> for Recorder {
    fn listen(&mut self, event: &ChartEvent, _ctx: &mut EventContext<'_, T>) {
        self.events.borrow_mut().push(*event);
    }
}

fn rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| Row {
            x: i as f64,
            close: 100.0 + i as f64,
        })
        .collect()
}

fn props() -> ChartProps<Row> {
    ChartProps::new("AAPL", rows(100), XAccessor::new(|row: &Row| row.x))
        .with_x_extents(XExtents::Literal(Domain::new(50.0, 99.0)))
        .with_pane(PaneDeclaration::new(
            PRICE,
            YExtents::Values(vec![YValue::single(|row: &Row| row.close)]),
        ))
}

fn engine_with(config: ChartEngineConfig) -> (Engine, Rc<RefCell<Vec<ChartEvent>>>) {
    let mut engine = ChartEngine::new(NullSurface::default(), config, props()).expect("engine");
    let events = Rc::new(RefCell::new(Vec::new()));
    engine
        .subscribe(
            SubscriberId::new(1),
            Recorder {
                events: Rc::clone(&events),
            },
        )
        .expect("subscribe");
    engine.run_frame(0.0).expect("initial frame");
    (engine, events)
}

fn engine() -> (Engine, Rc<RefCell<Vec<ChartEvent>>>) {
    engine_with(ChartEngineConfig::new(Viewport::new(500, 300)))
}

fn kinds(events: &Rc<RefCell<Vec<ChartEvent>>>) -> Vec<ChartEventKind> {
    events.borrow().iter().map(|event| event.kind).collect()
}

fn assert_domain(actual: Domain, start: f64, end: f64) {
    assert_abs_diff_eq!(actual.start, start, epsilon = 1e-9);
    assert_abs_diff_eq!(actual.end, end, epsilon = 1e-9);
}

#[test]
fn pointer_moves_within_a_frame_apply_once() {
    let (mut engine, events) = engine();
    engine
        .handle_input(InputEvent::pointer_down(250.0, 150.0))
        .expect("down");
    assert_eq!(engine.gesture_phase(), GesturePhase::Panning);

    engine
        .handle_input(InputEvent::pointer_move(300.0, 150.0))
        .expect("move");
    engine
        .handle_input(InputEvent::pointer_move(350.0, 150.0))
        .expect("move");
    assert_domain(engine.state().x_domain(), 50.0, 99.0);

    engine.run_frame(16.0).expect("frame");
    // 100 px of a 500 px range over a 49-unit domain.
    assert_domain(engine.state().x_domain(), 40.2, 89.2);
    assert_eq!(
        kinds(&events),
        vec![ChartEventKind::MouseDown, ChartEventKind::Pan]
    );
    assert_eq!(
        events.borrow()[1].detail,
        EventDetail::Pan { dx: 100.0, dy: 0.0 }
    );
}

#[test]
fn pointer_up_applies_the_final_position_and_ends_the_pan() {
    let (mut engine, events) = engine();
    engine
        .handle_input(InputEvent::pointer_down(250.0, 150.0))
        .expect("down");
    engine
        .handle_input(InputEvent::pointer_move(350.0, 150.0))
        .expect("move");
    engine.run_frame(16.0).expect("frame");
    engine
        .handle_input(InputEvent::pointer_up(360.0, 150.0))
        .expect("up");

    assert_eq!(engine.gesture_phase(), GesturePhase::Idle);
    let shift = 110.0 * 49.0 / 500.0;
    assert_domain(engine.state().x_domain(), 50.0 - shift, 99.0 - shift);
    let recorded = events.borrow();
    let end = recorded.last().expect("pan end");
    assert_eq!(end.kind, ChartEventKind::PanEnd);
    assert_eq!(end.detail, EventDetail::Pan { dx: 110.0, dy: 0.0 });
    assert_eq!(recorded[recorded.len() - 2].kind, ChartEventKind::MouseUp);
}

#[test]
fn panning_back_to_the_origin_restores_the_domain() {
    let (mut engine, _events) = engine();
    engine
        .handle_input(InputEvent::pointer_down(250.0, 150.0))
        .expect("down");
    engine
        .handle_input(InputEvent::pointer_move(420.0, 150.0))
        .expect("move");
    engine.run_frame(16.0).expect("frame");
    engine
        .handle_input(InputEvent::pointer_move(250.0, 150.0))
        .expect("move back");
    engine.run_frame(32.0).expect("frame");
    assert_domain(engine.state().x_domain(), 50.0, 99.0);
}

#[test]
fn idle_pointer_moves_coalesce_into_one_mouse_move() {
    let (mut engine, events) = engine();
    for x in [10.0, 20.0, 30.0] {
        engine
            .handle_input(InputEvent::pointer_move(x, 100.0))
            .expect("move");
    }
    assert!(events.borrow().is_empty());
    engine.run_frame(16.0).expect("frame");
    assert_eq!(kinds(&events), vec![ChartEventKind::MouseMove]);
    assert_eq!(engine.interaction().mouse.x, 30.0);
    assert!(engine.interaction().hovers(PRICE));
    // 30 px maps to 52.94, closest to row 53.
    assert_eq!(engine.interaction().current_item, Some(53));
}

#[test]
fn disabled_mouse_move_events_are_not_published() {
    let (mut engine, events) = engine_with(
        ChartEngineConfig::new(Viewport::new(500, 300)).with_events(true, true, false),
    );
    engine
        .handle_input(InputEvent::pointer_move(10.0, 100.0))
        .expect("move");
    engine.run_frame(16.0).expect("frame");
    assert!(events.borrow().is_empty());
}

#[test]
fn wheel_up_zooms_in_around_the_row_under_the_mouse() {
    let (mut engine, events) = engine();
    // Pixel 200 reads 69.6; row 70 is the nearest visible row.
    let row_px = engine.state().x_scale().map(70.0);
    engine
        .handle_input(InputEvent::wheel(200.0, 150.0, 0.0, -120.0))
        .expect("wheel");

    assert!((engine.state().x_scale().map(70.0) - row_px).abs() <= 1e-9);
    assert!((engine.state().x_domain().span() - 49.0 / 1.1).abs() <= 1e-9);
    let recorded = events.borrow();
    let zoom = recorded.last().expect("zoom event");
    assert_eq!(zoom.kind, ChartEventKind::Zoom);
    match zoom.detail {
        EventDetail::Zoom { anchor_x, factor } => {
            assert!((anchor_x - row_px).abs() <= 1e-12);
            assert!((factor - 1.0 / 1.1).abs() <= 1e-12);
        }
        other => panic!("unexpected detail {other:?}"),
    }
}

#[test]
fn wheel_down_zooms_out() {
    let (mut engine, _events) = engine();
    engine
        .handle_input(InputEvent::wheel(200.0, 150.0, 0.0, 120.0))
        .expect("wheel");
    assert!((engine.state().x_domain().span() - 49.0 * 1.1).abs() <= 1e-9);
}

#[test]
fn horizontal_wheel_pans_and_settles_after_the_debounce() {
    let (mut engine, events) = engine();
    engine
        .handle_input(InputEvent::wheel(200.0, 150.0, -50.0, 0.0))
        .expect("wheel");
    assert_eq!(engine.gesture_phase(), GesturePhase::Panning);

    engine.run_frame(0.0).expect("apply wheel pan");
    // Content follows the wheel: -50 px horizontal delta shifts the domain left.
    assert_domain(engine.state().x_domain(), 50.0 - 4.9, 99.0 - 4.9);
    assert_eq!(kinds(&events), vec![ChartEventKind::Pan]);

    engine.run_frame(16.0).expect("idle frame");
    engine.run_frame(115.0).expect("still within debounce");
    assert_eq!(engine.gesture_phase(), GesturePhase::Panning);

    engine.run_frame(116.0).expect("debounce elapsed");
    assert_eq!(engine.gesture_phase(), GesturePhase::Idle);
    assert_eq!(
        kinds(&events),
        vec![ChartEventKind::Pan, ChartEventKind::PanEnd]
    );
}

#[test]
fn modifier_gate_turns_plain_vertical_wheel_into_a_pan() {
    let config = ChartEngineConfig::new(Viewport::new(500, 300))
        .with_wheel_zoom_modifier(Some(ModifierKey::Ctrl));
    let (mut engine, _events) = engine_with(config);

    engine
        .handle_input(InputEvent::wheel(200.0, 150.0, 0.0, 100.0))
        .expect("plain wheel");
    engine.run_frame(16.0).expect("frame");
    assert_eq!(engine.gesture_phase(), GesturePhase::Panning);
    assert_domain(engine.state().x_domain(), 59.8, 108.8);

    engine
        .handle_input(InputEvent::Wheel {
            position: chart_viewport::core::Point::new(200.0, 150.0),
            delta_x: 0.0,
            delta_y: -100.0,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::none()
            },
        })
        .expect("ctrl wheel");
    // Zooming settles the wheel pan first.
    assert_eq!(engine.gesture_phase(), GesturePhase::Idle);
    assert!((engine.state().x_domain().span() - 49.0 / 1.1).abs() <= 1e-9);
}

#[test]
fn disabled_zoom_makes_vertical_wheel_pan() {
    let config = ChartEngineConfig::new(Viewport::new(500, 300)).with_events(true, false, true);
    let (mut engine, events) = engine_with(config);
    engine
        .handle_input(InputEvent::wheel(200.0, 150.0, 0.0, -120.0))
        .expect("wheel");
    engine.run_frame(16.0).expect("frame");
    assert!(!kinds(&events).contains(&ChartEventKind::Zoom));
    assert!((engine.state().x_domain().span() - 49.0).abs() <= 1e-9);
}

#[test]
fn disabled_pan_ignores_presses() {
    let config = ChartEngineConfig::new(Viewport::new(500, 300)).with_events(false, true, true);
    let (mut engine, _events) = engine_with(config);
    engine
        .handle_input(InputEvent::pointer_down(250.0, 150.0))
        .expect("down");
    assert_eq!(engine.gesture_phase(), GesturePhase::Idle);
}

#[test]
fn escape_cancels_a_pan_and_restores_the_viewport() {
    let (mut engine, events) = engine();
    engine
        .handle_input(InputEvent::pointer_down(250.0, 150.0))
        .expect("down");
    engine
        .handle_input(InputEvent::pointer_move(400.0, 150.0))
        .expect("move");
    engine.run_frame(16.0).expect("frame");
    assert!(engine.state().x_domain().start < 50.0);

    engine
        .handle_input(InputEvent::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::none(),
        })
        .expect("escape");
    assert_eq!(engine.gesture_phase(), GesturePhase::Idle);
    assert_domain(engine.state().x_domain(), 50.0, 99.0);
    let recorded = kinds(&events);
    assert_eq!(
        &recorded[recorded.len() - 2..],
        &[ChartEventKind::KeyDown, ChartEventKind::PanEnd]
    );
}

#[test]
fn cancelled_pan_rearms_the_data_request() {
    let (mut engine, _events) = engine();
    let requests = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&requests);
    engine.set_data_request_handler(move |request| sink.borrow_mut().push(request));

    for round in 1..=2 {
        engine
            .handle_input(InputEvent::pointer_down(0.0, 150.0))
            .expect("down");
        engine
            .handle_input(InputEvent::pointer_move(600.0, 150.0))
            .expect("move");
        engine.run_frame(16.0 * round as f64).expect("frame");
        assert_domain(engine.state().x_domain(), -8.8, 40.2);
        engine
            .handle_input(InputEvent::KeyDown {
                key: Key::Escape,
                modifiers: Modifiers::none(),
            })
            .expect("escape");
        assert_domain(engine.state().x_domain(), 50.0, 99.0);
        assert_eq!(requests.borrow().len(), round);
    }
}

#[test]
fn pan_past_the_first_row_asks_the_host_for_more_data() {
    let (mut engine, _events) = engine();
    let requests = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&requests);
    engine.set_data_request_handler(move |request| sink.borrow_mut().push(request));

    engine
        .handle_input(InputEvent::pointer_down(0.0, 150.0))
        .expect("down");
    engine
        .handle_input(InputEvent::pointer_move(500.0, 150.0))
        .expect("move");
    engine.run_frame(16.0).expect("frame");
    assert!(requests.borrow().is_empty());
    engine
        .handle_input(InputEvent::pointer_move(600.0, 150.0))
        .expect("move");
    engine.run_frame(32.0).expect("frame");
    engine
        .handle_input(InputEvent::pointer_up(620.0, 150.0))
        .expect("up");

    let requests = requests.borrow();
    assert_eq!(requests.len(), 1);
    assert!(matches!(
        requests[0],
        DataRequest::Before { first_x, .. } if first_x == 0.0
    ));
}

#[test]
fn non_finite_input_is_rejected() {
    let (mut engine, _events) = engine();
    assert!(
        engine
            .handle_input(InputEvent::pointer_down(f64::NAN, 1.0))
            .is_err()
    );
    assert!(
        engine
            .handle_input(InputEvent::wheel(10.0, 10.0, 0.0, f64::INFINITY))
            .is_err()
    );
    assert_eq!(engine.gesture_phase(), GesturePhase::Idle);
}
