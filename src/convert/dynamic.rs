//! Dynamic content token re-encoding
//!
//! Legacy documents embed dynamic-content expressions as base64 JSON inside
//! an `@dc@...@` envelope. Each decoded payload is verified by re-encoding:
//! if the bytes do not round-trip, the match was ordinary text that happened
//! to look like an envelope and is left alone. Decoding never fails a
//! conversion; every anomaly falls back to the original substring.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static ENVELOPE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"@dc@([A-Za-z0-9+/=]+)@").unwrap());

/// Replace every decodable dynamic-content token in `value` with the new
/// expression syntax, leaving undecodable tokens untouched
pub fn substitute_tokens(value: &str) -> String {
    if !value.contains("@dc@") {
        return value.to_string();
    }
    ENVELOPE_PATTERN
        .replace_all(value, |caps: &Captures| {
            decode_token(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Decode one captured envelope payload into the target expression.
///
/// Requires the payload to round-trip through base64, parse as JSON, and
/// carry the `dynamic` marker plus `content` and `settings` fields.
fn decode_token(encoded: &str) -> Option<String> {
    let bytes = BASE64.decode(encoded).ok()?;
    if BASE64.encode(&bytes) != encoded {
        return None;
    }
    let payload: Value = serde_json::from_slice(&bytes).ok()?;
    let fields = payload.as_object()?;
    if !fields.contains_key("dynamic") {
        return None;
    }
    let name = fields.get("content")?.as_str()?;
    let settings = fields.get("settings")?.clone();

    let mut expression = Map::new();
    expression.insert("name".to_string(), Value::String(name.to_string()));
    expression.insert("settings".to_string(), settings);
    let json = serde_json::to_string(&Value::Object(expression)).ok()?;
    Some(format!("$dynamic({json})$"))
}

/// Build the legacy envelope for a payload. Test fixtures and round-trip
/// checks use this; document conversion never re-encodes.
pub fn encode_token(payload: &Value) -> String {
    let json = serde_json::to_string(payload).expect("payload serializes to JSON");
    format!("@dc@{}@", BASE64.encode(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(payload: Value) -> String {
        encode_token(&payload)
    }

    #[test]
    fn test_decodes_valid_token() {
        let value = token(json!({
            "dynamic": true,
            "content": "post_title",
            "settings": {"before": "", "after": ""}
        }));
        assert_eq!(
            substitute_tokens(&value),
            r#"$dynamic({"name":"post_title","settings":{"after":"","before":""}})$"#
        );
    }

    #[test]
    fn test_substitutes_inside_surrounding_text() {
        let value = format!(
            "Title: {} (generated)",
            token(json!({"dynamic": true, "content": "post_title", "settings": {}}))
        );
        assert_eq!(
            substitute_tokens(&value),
            r#"Title: $dynamic({"name":"post_title","settings":{}})$ (generated)"#
        );
    }

    #[test]
    fn test_missing_fields_left_untouched() {
        let no_marker = token(json!({"content": "post_title", "settings": {}}));
        assert_eq!(substitute_tokens(&no_marker), no_marker);

        let no_settings = token(json!({"dynamic": true, "content": "post_title"}));
        assert_eq!(substitute_tokens(&no_settings), no_settings);

        let no_content = token(json!({"dynamic": true, "settings": {}}));
        assert_eq!(substitute_tokens(&no_content), no_content);
    }

    #[test]
    fn test_invalid_base64_left_untouched() {
        let value = "@dc@!!!not-base64!!!@";
        assert_eq!(substitute_tokens(value), value);
    }

    #[test]
    fn test_non_round_tripping_payload_left_untouched() {
        // Unpadded encoding decodes but does not re-encode to itself
        let canonical = BASE64.encode(br#"{"dynamic":true,"content":"a","settings":{}}"#);
        let stripped = canonical.trim_end_matches('=').to_string();
        if stripped != canonical {
            let value = format!("@dc@{stripped}@");
            assert_eq!(substitute_tokens(&value), value);
        }
    }

    #[test]
    fn test_non_json_payload_left_untouched() {
        let value = format!("@dc@{}@", BASE64.encode(b"plain words"));
        assert_eq!(substitute_tokens(&value), value);
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(substitute_tokens("no tokens here"), "no tokens here");
        assert_eq!(substitute_tokens("user@dc@ incomplete"), "user@dc@ incomplete");
    }
}
