use super::*;

#[test]
fn defaults_validate() {
    let cfg = PipelineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.capture.size.width, 1024);
    assert_eq!(cfg.capture.size.height, 768);
    assert_eq!(cfg.capture.background, Rgba8::WHITE);
    assert_eq!(cfg.strokes.min_point_distance, 0.002);
    assert_eq!(cfg.inference.describe_max_tokens, 200);
    assert_eq!(cfg.inference.summary_min_length, 30);
    assert_eq!(cfg.inference.summary_max_length, 120);
    assert_eq!(cfg.inference.timeout(), Duration::from_secs(30));
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = PipelineConfig::from_json_str(
        r#"{ "capture": { "size": { "width": 640, "height": 480 } },
             "inference": { "timeout_secs": 5 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.capture.size.width, 640);
    assert_eq!(cfg.capture.default_width_px, 6.0);
    assert_eq!(cfg.inference.timeout_secs, 5);
    assert_eq!(cfg.inference.vision_model, DEFAULT_VISION_MODEL);
}

#[test]
fn rejects_inverted_summary_bounds() {
    let err = PipelineConfig::from_json_str(
        r#"{ "inference": { "summary_min_length": 200, "summary_max_length": 100 } }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("summary_min_length"));
}

#[test]
fn rejects_template_without_placeholder() {
    let mut cfg = PipelineConfig::default();
    cfg.inference.summary_template = "Summarize".to_string();
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_zero_timeout_and_bad_epsilon() {
    let mut cfg = PipelineConfig::default();
    cfg.inference.timeout_secs = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = PipelineConfig::default();
    cfg.strokes.min_point_distance = f32::NAN;
    assert!(cfg.validate().is_err());
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, SketchError::Config(_)));
}
