use chart_viewport::api::{
    ChartEngine, ChartEngineConfig, ChartProps, SubscriberId, Subscriber,
    VIEWPORT_SNAPSHOT_JSON_SCHEMA_V1, ViewportSnapshot, XExtents, ZoomAnchor,
};
use chart_viewport::core::{
    ClampPolicy, Domain, Padding, PaneDeclaration, PaneId, Viewport, XAccessor, YExtents, YValue,
};
use chart_viewport::interaction::{GesturePhase, InputEvent, ModifierKey};
use chart_viewport::render::NullSurface;
use chart_viewport::ChartError;

struct Quiet;

impl<T, S> Subscriber<T, S> for Quiet {}

fn build_engine() -> ChartEngine<(f64, f64), NullSurface> {
    let rows: Vec<(f64, f64)> = (0..40).map(|i| (i as f64, 10.0 + i as f64)).collect();
    let props = ChartProps::new("BTCUSD", rows, XAccessor::new(|row: &(f64, f64)| row.0))
        .with_x_extents(XExtents::Literal(Domain::new(20.0, 39.0)))
        .with_pane(PaneDeclaration::new(
            PaneId::new(1),
            YExtents::Values(vec![YValue::single(|row: &(f64, f64)| row.1)]),
        ));
    ChartEngine::new(
        NullSurface::default(),
        ChartEngineConfig::new(Viewport::new(640, 480)),
        props,
    )
    .expect("engine init")
}

#[test]
fn chart_engine_config_json_roundtrip() {
    let config = ChartEngineConfig::new(Viewport::new(1024, 768))
        .with_x_padding(Padding::Sides {
            start: 4.0,
            end: 12.0,
        })
        .with_clamp(ClampPolicy::Left)
        .with_zoom_anchor(ZoomAnchor::RightDomain)
        .with_zoom_multiplier(1.25)
        .with_wheel_zoom_modifier(Some(ModifierKey::Alt))
        .with_wheel_pan_end_debounce_ms(250.0);

    let json = config
        .to_json_pretty()
        .expect("config should serialize to json");
    let restored = ChartEngineConfig::from_json_str(&json).expect("config should deserialize");

    assert_eq!(restored, config);
}

#[test]
fn partial_config_json_falls_back_to_defaults() {
    let restored = ChartEngineConfig::from_json_str(r#"{"viewport":{"width":300,"height":200}}"#)
        .expect("minimal config");
    assert_eq!(restored, ChartEngineConfig::new(Viewport::new(300, 200)));
    assert_eq!(restored.zoom_multiplier, 1.1);
    assert_eq!(restored.wheel_pan_end_debounce_ms, 100.0);
    assert!(restored.pan_event && restored.zoom_event && restored.mouse_move_event);
}

#[test]
fn malformed_config_json_is_invalid_data() {
    let err = ChartEngineConfig::from_json_str("{ not json").expect_err("must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn snapshot_reflects_viewport_and_subscribers() {
    let mut engine = build_engine();
    engine
        .subscribe(SubscriberId::new(7), Quiet)
        .expect("subscribe");
    engine
        .subscribe(SubscriberId::new(3), Quiet)
        .expect("subscribe");
    engine
        .handle_input(InputEvent::pointer_down(320.0, 240.0))
        .expect("down");

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.series_name, "BTCUSD");
    assert_eq!(snapshot.x_domain, Domain::new(20.0, 39.0));
    assert_eq!(snapshot.x_range, (0.0, 640.0));
    assert_eq!(snapshot.plot_range, (20, 40));
    assert_eq!(snapshot.full_len, 40);
    assert_eq!(snapshot.panes.len(), 1);
    assert_eq!(snapshot.gesture, GesturePhase::Panning);
    assert_eq!(
        snapshot.subscribers,
        vec![SubscriberId::new(7), SubscriberId::new(3)]
    );
}

#[test]
fn snapshot_json_contract_roundtrip() {
    let engine = build_engine();
    let snapshot = engine.snapshot();

    let json = snapshot
        .to_json_contract_v1_pretty()
        .expect("contract should serialize");
    assert!(json.contains(&format!(
        "\"schema_version\": {VIEWPORT_SNAPSHOT_JSON_SCHEMA_V1}"
    )));
    let decoded = ViewportSnapshot::from_json_compat_str(&json).expect("contract should parse");
    assert_eq!(decoded, snapshot);

    let bare = snapshot.to_json_pretty().expect("bare snapshot");
    let decoded_bare = ViewportSnapshot::from_json_compat_str(&bare).expect("bare should parse");
    assert_eq!(decoded_bare, snapshot);
}

#[test]
fn snapshot_contract_rejects_unknown_schema_version() {
    let engine = build_engine();
    let json = engine
        .snapshot()
        .to_json_contract_v1_pretty()
        .expect("contract should serialize");
    let bumped = json.replacen(
        &format!("\"schema_version\": {VIEWPORT_SNAPSHOT_JSON_SCHEMA_V1}"),
        "\"schema_version\": 99",
        1,
    );

    let err = ViewportSnapshot::from_json_compat_str(&bumped).expect_err("must reject");
    match err {
        ChartError::InvalidData(message) => assert!(message.contains("unsupported")),
        other => panic!("unexpected error {other:?}"),
    }
}
