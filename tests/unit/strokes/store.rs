use super::*;

fn store() -> StrokeStore {
    StrokeStore::default()
}

#[test]
fn begin_is_noop_while_drawing() {
    let mut s = store();
    assert!(s.begin_stroke());
    assert!(s.append_point(Point::new(0.0, 0.0, 0.0)));
    assert!(!s.begin_stroke());
    assert_eq!(s.in_progress().unwrap().len(), 1);
}

#[test]
fn append_without_stroke_is_ignored() {
    let mut s = store();
    assert!(!s.append_point(Point::ZERO));
    assert!(s.is_empty());
}

#[test]
fn close_points_are_decimated() {
    let mut s = store();
    s.begin_stroke();
    assert!(s.append_point(Point::new(0.0, 0.0, 0.0)));
    for i in 1..10 {
        assert!(!s.append_point(Point::new(0.0001 * i as f32 / 10.0, 0.0, 0.0)));
    }
    assert_eq!(s.in_progress().unwrap().points(), &[Point::ZERO]);
    assert!(s.append_point(Point::new(0.01, 0.0, 0.0)));
    assert_eq!(s.in_progress().unwrap().len(), 2);
}

#[test]
fn decimation_compares_against_last_recorded_point() {
    let mut s = store();
    s.begin_stroke();
    s.append_point(Point::ZERO);
    // Each step is below epsilon relative to its predecessor, but the comparison is always
    // against the last *recorded* point.
    s.append_point(Point::new(0.0015, 0.0, 0.0));
    assert!(s.append_point(Point::new(0.003, 0.0, 0.0)));
    assert_eq!(s.in_progress().unwrap().len(), 2);
}

#[test]
fn non_finite_points_are_rejected() {
    let mut s = store();
    s.begin_stroke();
    assert!(!s.append_point(Point::new(f32::NAN, 0.0, 0.0)));
    assert!(s.in_progress().unwrap().is_empty());
}

#[test]
fn short_strokes_are_discarded() {
    let mut s = store();
    s.begin_stroke();
    assert!(!s.end_stroke());
    assert!(!s.is_drawing());

    s.begin_stroke();
    s.append_point(Point::ZERO);
    assert!(!s.end_stroke());
    assert_eq!(s.stroke_count(), 0);
    assert!(!s.is_drawing());

    s.begin_stroke();
    s.append_point(Point::ZERO);
    s.append_point(Point::new(1.0, 0.0, 0.0));
    assert!(s.end_stroke());
    assert_eq!(s.stroke_count(), 1);
}

#[test]
fn end_without_stroke_is_noop() {
    let mut s = store();
    assert!(!s.end_stroke());
}

#[test]
fn strokes_keep_insertion_order_and_style() {
    let mut s = store();
    let red = StrokeStyle {
        color: Rgba8::opaque(255, 0, 0),
        width_px: 3.0,
    };
    for (i, style) in [StrokeStyle::default(), red].into_iter().enumerate() {
        s.begin_stroke_with(style);
        s.append_point(Point::new(i as f32, 0.0, 0.0));
        s.append_point(Point::new(i as f32, 1.0, 0.0));
        s.end_stroke();
    }
    assert_eq!(s.finalized()[0].points()[0].x, 0.0);
    assert_eq!(s.finalized()[1].points()[0].x, 1.0);
    assert_eq!(s.finalized()[1].style(), red);
    assert!((s.finalized()[0].length() - 1.0).abs() < 1e-6);
}

#[test]
fn clear_all_empties_everything() {
    let mut s = store();
    s.begin_stroke();
    s.append_point(Point::ZERO);
    s.append_point(Point::X);
    s.end_stroke();
    s.begin_stroke();
    s.append_point(Point::Y);

    assert_eq!(s.clear_all(), 2);
    assert!(s.is_empty());
    assert!(!s.is_drawing());
    assert_eq!(s.clear_all(), 0);
}

#[test]
fn snapshot_policy_controls_in_progress() {
    let mut s = store();
    s.begin_stroke();
    s.append_point(Point::ZERO);
    s.append_point(Point::X);
    s.end_stroke();
    s.begin_stroke();
    s.append_point(Point::Y);

    assert_eq!(s.snapshot(false).strokes().len(), 1);
    let with_current = s.snapshot(true);
    assert_eq!(with_current.strokes().len(), 2);
    assert_eq!(with_current.strokes()[1].points(), &[Point::Y]);

    // Later writes do not leak into an earlier snapshot.
    s.append_point(Point::new(0.0, 2.0, 0.0));
    assert_eq!(with_current.strokes()[1].len(), 1);
}

#[test]
fn empty_snapshot_reports_empty() {
    assert!(store().snapshot(true).is_empty());
}

#[test]
fn from_config_uses_configured_epsilon_and_ink() {
    let mut cfg = PipelineConfig::default();
    cfg.strokes.min_point_distance = 0.5;
    cfg.capture.default_color = Rgba8::opaque(0, 0, 255);
    let mut s = StrokeStore::from_config(&cfg);
    s.begin_stroke();
    s.append_point(Point::ZERO);
    assert!(!s.append_point(Point::new(0.4, 0.0, 0.0)));
    assert!(s.append_point(Point::new(0.6, 0.0, 0.0)));
    assert_eq!(s.in_progress().unwrap().style().color, Rgba8::opaque(0, 0, 255));
}
