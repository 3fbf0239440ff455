use crate::inference::failure::FailureKind;
use crate::inference::transport::ScriptedTransport;

use super::*;

fn client() -> InferenceClient<ScriptedTransport> {
    InferenceClient::new(ScriptedTransport::new(), InferenceConfig::default())
}

fn token() -> Credential {
    Credential::new("hf_test").unwrap()
}

const CHAT_OK: &str = r#"{"choices":[{"message":{"role":"assistant","content":"a red circle"}}]}"#;

#[test]
fn describe_body_matches_wire_contract() {
    let cfg = InferenceConfig::default();
    let body = build_describe_request(&cfg, "data:image/png;base64,AAAA");
    assert_eq!(body["model"], cfg.vision_model);
    assert_eq!(body["max_tokens"], 200);
    let content = &body["messages"][0]["content"];
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(content[0]["type"], "image_url");
    assert_eq!(content[0]["image_url"]["url"], "data:image/png;base64,AAAA");
    assert_eq!(content[1]["type"], "text");
    assert_eq!(content[1]["text"], cfg.describe_prompt);
}

#[test]
fn summarize_body_escapes_caption() {
    let cfg = InferenceConfig::default();
    let caption = "a \"quoted\" word\\path\nnext line";
    let body = build_summarize_request(&cfg, caption);
    assert_eq!(body["parameters"]["max_length"], 120);
    assert_eq!(body["parameters"]["min_length"], 30);
    let inputs = body["inputs"].as_str().unwrap();
    assert!(inputs.contains("whiteboard notes"));
    assert!(inputs.ends_with(caption));

    // The serialized payload is valid JSON and round-trips the raw caption.
    let wire = serde_json::to_string(&body).unwrap();
    assert!(wire.contains(r#"\"quoted\""#));
    assert!(wire.contains(r#"\\path\nnext"#));
    let back: serde_json::Value = serde_json::from_str(&wire).unwrap();
    assert_eq!(back, body);
}

#[tokio::test]
async fn describe_extracts_caption_and_sends_auth() {
    let c = client();
    c.transport().push_reply(200, CHAT_OK);
    let caption = c.describe(&token(), &[1, 2, 3]).await.unwrap();
    assert_eq!(caption.as_str(), "a red circle");

    let reqs = c.transport().requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].url, c.config().vision_url);
    assert_eq!(reqs[0].authorization, "Bearer hf_test");
    let url = reqs[0].body["messages"][0]["content"][0]["image_url"]["url"]
        .as_str()
        .unwrap();
    assert_eq!(url, "data:image/png;base64,AQID");
}

#[tokio::test]
async fn describe_reports_http_status() {
    let c = client();
    c.transport()
        .push_reply(503, r#"{"error":"Model is currently loading","estimated_time":20.0}"#);
    let f = c.describe(&token(), &[0]).await.unwrap_err();
    assert_eq!(f.stage, Stage::Describe);
    assert_eq!(f.kind, FailureKind::HttpStatus);
    assert_eq!(f.http_status, Some(503));
    assert_eq!(f.reason, "Model is currently loading");
    assert!(f.is_transient());
}

#[tokio::test]
async fn describe_reports_transport_errors() {
    let c = client();
    c.transport().push_error("connection refused", false);
    let f = c.describe(&token(), &[0]).await.unwrap_err();
    assert_eq!(f.kind, FailureKind::Transport);
    assert_eq!(f.http_status, None);
    assert!(f.reason.contains("connection refused"));
}

#[tokio::test]
async fn describe_without_text_is_empty_extraction() {
    let c = client();
    c.transport()
        .push_reply(200, r#"{"choices":[{"message":{"content":""}}]}"#);
    let f = c.describe(&token(), &[0]).await.unwrap_err();
    assert_eq!(f.kind, FailureKind::EmptyExtraction);
    assert_eq!(f.reason, "no caption returned");
}

#[tokio::test]
async fn summarize_success() {
    let c = client();
    c.transport()
        .push_reply(200, r#"[{"summary_text":"Circle drawn in red."}]"#);
    let s = c.summarize(&token(), "a red circle").await;
    assert_eq!(s.text, "Circle drawn in red.");
    assert!(!s.is_degraded());
    assert_eq!(c.transport().requests()[0].url, c.config().summary_url);
}

#[tokio::test]
async fn summarize_transport_failure_falls_back_to_prefixed_caption() {
    let c = client();
    c.transport().push_error("timed out", true);
    let s = c.summarize(&token(), "a red circle").await;
    assert_eq!(s.text, "Whiteboard shows: a red circle");
    assert_eq!(s.degraded.unwrap().kind, FailureKind::Timeout);
}

#[tokio::test]
async fn summarize_http_failure_falls_back_to_prefixed_caption() {
    let c = client();
    c.transport().push_reply(500, "internal error");
    let s = c.summarize(&token(), "a red circle").await;
    assert_eq!(s.text, "Whiteboard shows: a red circle");
    assert_eq!(s.degraded.unwrap().http_status, Some(500));
}

#[tokio::test]
async fn summarize_empty_extraction_returns_caption() {
    let c = client();
    c.transport().push_reply(200, r#"[{"summary_text":""}]"#);
    let s = c.summarize(&token(), "a red circle").await;
    assert_eq!(s.text, "a red circle");
    assert_eq!(
        s.degraded.unwrap().kind,
        FailureKind::EmptyExtraction
    );
}

#[test]
fn status_failure_falls_back_to_status_code() {
    let f = status_failure(Stage::Describe, &HttpReply::new(502, "   "));
    assert_eq!(f.reason, "HTTP 502");
    let long = "x".repeat(1000);
    let f = status_failure(Stage::Describe, &HttpReply::new(400, long));
    assert_eq!(f.reason.len(), MAX_REASON_CHARS);
}
