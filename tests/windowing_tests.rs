use chart_viewport::core::{
    ClampPolicy, Domain, FallbackEnd, Scale, Window, WindowHints, WindowOptions, XAccessor,
    closest_index, rows_in_domain, window,
};
use chart_viewport::ChartError;
use chrono::{Duration, TimeZone, Utc};

fn rows(count: usize) -> Vec<(f64, f64)> {
    (0..count).map(|i| (i as f64, 100.0 + i as f64)).collect()
}

fn x() -> XAccessor<(f64, f64)> {
    XAccessor::new(|row: &(f64, f64)| row.0)
}

fn scale(width: f64) -> Scale {
    Scale::linear(0.0, 1.0)
        .expect("scale")
        .with_range(0.0, width)
}

#[test]
fn density_guard_keeps_the_rightmost_rows() {
    let data = rows(100);
    let result = window(
        &data,
        &x(),
        Domain::new(0.0, 99.0),
        &scale(40.0),
        &WindowOptions::default(),
        &WindowHints::default(),
    )
    .expect("window");

    // 40 px at 2 points per px keeps 80 rows ending at the last one.
    assert_eq!(result.range, 20..100);
    assert_eq!(result.domain, Domain::new(20.0, 99.0));
}

#[test]
fn density_guard_caps_a_domain_far_wider_than_the_data() {
    let data = rows(2_000);
    let result = window(
        &data,
        &x(),
        Domain::new(0.0, 1e7),
        &scale(500.0),
        &WindowOptions::default(),
        &WindowHints::default(),
    )
    .expect("window");

    // All rows land inside one pixel; 500 px still fits only 1,000 of them.
    assert_eq!(result.range, 1_000..2_000);
    assert_eq!(result.domain, Domain::new(1_000.0, 1_999.0));

    let again = window(
        &data,
        &x(),
        result.domain,
        &scale(500.0),
        &WindowOptions::default(),
        &WindowHints::default(),
    )
    .expect("second window");
    assert_eq!(again, result);
}

#[test]
fn density_guard_accepts_exactly_the_maximum() {
    let data = rows(80);
    let result = window(
        &data,
        &x(),
        Domain::new(0.0, 79.0),
        &scale(40.0),
        &WindowOptions::default(),
        &WindowHints::default(),
    )
    .expect("window");
    assert_eq!(result.range, 0..80);
}

#[test]
fn overcrowded_zoom_out_keeps_current_window() {
    let data = rows(100);
    let current = Window {
        range: 40..61,
        domain: Domain::new(40.0, 60.0),
    };
    let result = window(
        &data,
        &x(),
        Domain::new(-500.0, 600.0),
        &scale(40.0),
        &WindowOptions::default(),
        &WindowHints::keep_current(current.clone()),
    )
    .expect("window");
    assert_eq!(result, current);
}

#[test]
fn too_sparse_zoom_in_keeps_current_window() {
    let data = rows(100);
    let current = Window {
        range: 10..31,
        domain: Domain::new(10.0, 30.0),
    };
    // Three rows across 1000 px is below one point per hundred pixels.
    let result = window(
        &data,
        &x(),
        Domain::new(10.0, 12.0),
        &scale(1000.0),
        &WindowOptions::default(),
        &WindowHints::keep_current(current.clone()),
    )
    .expect("window");
    assert_eq!(result, current);
}

#[test]
fn single_row_window_falls_back_to_previous_start() {
    let data = rows(100);
    let hints = WindowHints {
        current: None,
        fallback_start: Some(5.0),
        fallback_end: None,
    };
    let result = window(
        &data,
        &x(),
        Domain::new(9.5, 10.5),
        &scale(500.0),
        &WindowOptions::default(),
        &hints,
    )
    .expect("window");
    assert_eq!(result.domain, Domain::new(5.0, 6.0));
    assert_eq!(result.range, 5..7);
}

#[test]
fn fallback_end_keeps_last_row_on_its_old_pixel() {
    let data = rows(100);
    let old_scale = Scale::linear(0.0, 50.0).expect("scale").with_range(0.0, 500.0);
    let hints = WindowHints {
        current: None,
        fallback_start: Some(0.0),
        fallback_end: Some(FallbackEnd {
            last_x: 25.0,
            last_item_px: old_scale.map(25.0),
        }),
    };
    let result = window(
        &data,
        &x(),
        Domain::new(49.5, 50.4),
        &old_scale,
        &WindowOptions::default(),
        &hints,
    )
    .expect("window");

    // Row 25 sat at 250 px of 500, so the end stretches to 50.
    assert!((result.domain.start - 0.0).abs() <= 1e-9);
    assert!((result.domain.end - 50.0).abs() <= 1e-9);
    assert_eq!(result.range, 0..51);
}

#[test]
fn clamp_right_holds_end_on_last_row() {
    let data = rows(100);
    let options = WindowOptions {
        clamp: ClampPolicy::Right,
        ..WindowOptions::default()
    };
    let result = window(
        &data,
        &x(),
        Domain::new(60.0, 140.0),
        &scale(500.0),
        &options,
        &WindowHints::default(),
    )
    .expect("window");
    assert_eq!(result.domain, Domain::new(60.0, 99.0));
    assert_eq!(result.range, 60..100);
}

#[test]
fn clamp_both_keeps_descending_orientation() {
    let data = rows(100);
    let options = WindowOptions {
        clamp: ClampPolicy::Both,
        ..WindowOptions::default()
    };
    let result = window(
        &data,
        &x(),
        Domain::new(150.0, -20.0),
        &scale(500.0),
        &options,
        &WindowHints::default(),
    )
    .expect("window");
    assert_eq!(result.domain, Domain::new(99.0, 0.0));
    assert_eq!(result.range, 0..100);
}

#[test]
fn non_finite_candidate_is_rejected() {
    let data = rows(10);
    let err = window(
        &data,
        &x(),
        Domain::new(f64::NAN, 5.0),
        &scale(500.0),
        &WindowOptions::default(),
        &WindowHints::default(),
    )
    .expect_err("nan domain must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn rows_in_domain_is_inclusive_and_orientation_free() {
    let data = rows(20);
    assert_eq!(rows_in_domain(&data, &x(), Domain::new(3.0, 7.0)), 3..8);
    assert_eq!(rows_in_domain(&data, &x(), Domain::new(7.0, 3.0)), 3..8);
    assert_eq!(rows_in_domain(&data, &x(), Domain::new(30.0, 40.0)), 20..20);
}

#[test]
fn closest_index_snaps_to_nearest_row() {
    let data = rows(20);
    assert_eq!(closest_index(&data, &x(), 10.4), Some(10));
    assert_eq!(closest_index(&data, &x(), 10.6), Some(11));
    assert_eq!(closest_index(&data, &x(), -5.0), Some(0));
    assert_eq!(closest_index(&data, &x(), 500.0), Some(19));
    assert_eq!(closest_index(&data, &x(), f64::NAN), None);
    assert_eq!(closest_index(&Vec::<(f64, f64)>::new(), &x(), 1.0), None);
}

#[test]
fn datetime_accessor_windows_daily_rows() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("start");
    let days: Vec<_> = (0..60).map(|i| start + Duration::days(i)).collect();
    let accessor = XAccessor::datetime(|day: &chrono::DateTime<Utc>| *day);

    let from = accessor.value(&days[10]);
    let to = accessor.value(&days[29]);
    let result = window(
        &days,
        &accessor,
        Domain::new(from, to),
        &scale(800.0),
        &WindowOptions::default(),
        &WindowHints::default(),
    )
    .expect("window");
    assert_eq!(result.range, 10..30);
}
