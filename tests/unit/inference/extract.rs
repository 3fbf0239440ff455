use super::*;

#[test]
fn escaped_quotes_and_newlines_survive() {
    let body = r#"{"summary_text":"He said \"hi\"\nline2"}"#;
    assert_eq!(
        extract_text_field(body, "summary_text").as_deref(),
        Some("He said \"hi\"\nline2")
    );
}

#[test]
fn first_array_element_is_unwrapped() {
    let body = r#"[{"summary_text":"Circle drawn in red."},{"summary_text":"ignored"}]"#;
    assert_eq!(
        extract_text_field(body, "summary_text").as_deref(),
        Some("Circle drawn in red.")
    );
}

#[test]
fn chat_completion_content_is_found() {
    let body = r#"{
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": "a red circle" } }
        ],
        "usage": { "completion_tokens": 4 }
    }"#;
    assert_eq!(
        extract_text_field(body, "content").as_deref(),
        Some("a red circle")
    );
}

#[test]
fn content_parts_are_joined() {
    let body = r#"{"choices":[{"message":{"content":[
        {"type":"text","text":"a red "},
        {"type":"text","text":"circle"}
    ]}}]}"#;
    assert_eq!(
        extract_text_field(body, "content").as_deref(),
        Some("a red circle")
    );
}

#[test]
fn nested_field_is_found_depth_first() {
    let body = r#"{"outer":{"inner":[{"caption":"  sketch of a house  "}]}}"#;
    assert_eq!(
        extract_text_field(body, "caption").as_deref(),
        Some("sketch of a house")
    );
}

#[test]
fn empty_or_missing_text_is_none() {
    assert_eq!(extract_text_field(r#"{"summary_text":""}"#, "summary_text"), None);
    assert_eq!(extract_text_field(r#"{"summary_text":"   "}"#, "summary_text"), None);
    assert_eq!(extract_text_field(r#"{"other":"x"}"#, "summary_text"), None);
    assert_eq!(extract_text_field("[]", "summary_text"), None);
    assert_eq!(extract_text_field(r#"{"summary_text":42}"#, "summary_text"), None);
}

#[test]
fn invalid_json_falls_back_to_lexical_scan() {
    // Trailing garbage makes the body invalid JSON.
    let body = r#"{"summary_text":"He said \"hi\"\nline2 \\ done"} <eof>"#;
    assert_eq!(
        extract_text_field(body, "summary_text").as_deref(),
        Some("He said \"hi\"\nline2 \\ done")
    );
}

#[test]
fn lexical_scan_skips_non_string_occurrences() {
    let body = r#"xx "content": null, "content" : "second" yy"#;
    assert_eq!(scan_string_field(body, "content").as_deref(), Some("second"));
}

#[test]
fn lexical_scan_decodes_unicode_escapes() {
    let body = r#"garbage "content":"caf\u00e9 \ud83d\ude00""#;
    assert_eq!(scan_string_field(body, "content").as_deref(), Some("café 😀"));
}

#[test]
fn unterminated_literal_is_none() {
    assert_eq!(scan_string_field(r#"{"content":"never closed"#, "content"), None);
}
