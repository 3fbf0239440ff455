//! Tolerant text-field extraction from provider response envelopes.
//!
//! Providers disagree on envelope shape: some answer with an object, some with a one-element
//! array wrapping that object, and chat-style APIs nest the text under `choices[0].message`.
//! Extraction parses the body structurally and looks the field up in the known places first,
//! then anywhere in the document. Bodies that are not valid JSON (truncated, or wrapped in
//! stray text) fall back to a lexical scan that honors JSON string escapes.

use serde_json::Value;

/// Extract the first non-empty text value of `field` from a response body.
///
/// Returns the value with surrounding whitespace trimmed, or `None` if nothing usable was
/// found.
pub fn extract_text_field(body: &str, field: &str) -> Option<String> {
    let raw = match serde_json::from_str::<Value>(body) {
        Ok(value) => extract_from_value(&value, field),
        Err(_) => scan_string_field(body, field),
    }?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Structured lookup: direct object or first array element, known path, then depth-first.
pub fn extract_from_value(value: &Value, field: &str) -> Option<String> {
    let root = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };

    if let Some(text) = root.get(field).and_then(text_of) {
        return Some(text);
    }

    let chat = root
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get(field))
        .and_then(text_of);
    if chat.is_some() {
        return chat;
    }

    find_first(root, field)
}

/// Text carried by a field value: a string, or an array of content parts with `text` members.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(parts) => {
            let joined: String = parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(_) => part.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("");
            (!joined.trim().is_empty()).then_some(joined)
        }
        _ => None,
    }
}

fn find_first(value: &Value, field: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(text) = map.get(field).and_then(text_of) {
                return Some(text);
            }
            map.values().find_map(|child| find_first(child, field))
        }
        Value::Array(items) => items.iter().find_map(|item| find_first(item, field)),
        _ => None,
    }
}

/// Lexical fallback: locate `"field"`, then read the following JSON string literal.
///
/// Occurrences whose value is not a string literal are skipped. An unterminated literal
/// yields `None`.
pub fn scan_string_field(body: &str, field: &str) -> Option<String> {
    let label = format!("\"{field}\"");
    let mut search_from = 0;
    while let Some(pos) = body[search_from..].find(&label) {
        let after_label = search_from + pos + label.len();
        search_from = after_label;

        let rest = body[after_label..].trim_start();
        let Some(rest) = rest.strip_prefix(':') else {
            continue;
        };
        let Some(literal) = rest.trim_start().strip_prefix('"') else {
            continue;
        };
        if let Some(text) = read_string_literal(literal)
            && !text.trim().is_empty()
        {
            return Some(text);
        }
    }
    None
}

/// Decode a JSON string body up to its closing unescaped quote.
fn read_string_literal(s: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(out),
            '\\' => match chars.next()? {
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                '/' => out.push('/'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'u' => out.push(read_unicode_escape(&mut chars)?),
                other => out.push(other),
            },
            other => out.push(other),
        }
    }
    None
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut v = 0u32;
    for _ in 0..4 {
        v = v * 16 + chars.next()?.to_digit(16)?;
    }
    Some(v)
}

fn read_unicode_escape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let hi = read_hex4(chars)?;
    if (0xD800..0xDC00).contains(&hi) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            let lo = read_hex4(&mut lookahead)?;
            if (0xDC00..0xE000).contains(&lo) {
                *chars = lookahead;
                let code = 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00);
                return Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
        return Some(char::REPLACEMENT_CHARACTER);
    }
    Some(char::from_u32(hi).unwrap_or(char::REPLACEMENT_CHARACTER))
}

#[cfg(test)]
#[path = "../../tests/unit/inference/extract.rs"]
mod tests;
