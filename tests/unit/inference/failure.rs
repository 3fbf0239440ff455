use super::*;

#[test]
fn model_loading_is_transient_and_explained() {
    let f = StageFailure::status(Stage::Describe, 503, "Model is currently loading");
    assert!(f.is_transient());
    assert!(f.is_model_loading());
    let msg = f.user_message();
    assert!(msg.starts_with("describe failed (HTTP 503)"));
    assert!(msg.contains("still loading"));
}

#[test]
fn auth_failures_are_not_transient() {
    let f = StageFailure::status(Stage::Describe, 401, "unauthorized");
    assert!(!f.is_transient());
    assert!(f.user_message().contains("token was rejected"));
}

#[test]
fn rate_limits_and_timeouts_are_transient() {
    assert!(StageFailure::status(Stage::Describe, 429, "slow down").is_transient());
    assert!(StageFailure::transport(Stage::Describe, "deadline", true).is_transient());
    assert_eq!(
        StageFailure::transport(Stage::Describe, "deadline", true).kind,
        FailureKind::Timeout
    );
}

#[test]
fn empty_extraction_is_terminal() {
    let f = StageFailure::empty(Stage::Describe, "no caption returned");
    assert!(!f.is_transient());
    assert_eq!(f.http_status, None);
    assert!(f.to_string().contains("no caption returned"));
}
