//! Block marker and attribute payload encoding
//!
//! A block is an HTML comment pair `<!-- tag {json} -->...<!-- /tag -->`,
//! self-closing (`/-->`) when it has no body. The attribute payload is
//! compact JSON with a comment-safe escape layer on top: sequences that
//! could terminate the surrounding comment or open a tag are rewritten to
//! unicode escapes, which plain JSON decoding reverses on read.

use serde_json::{Map, Value};

/// Serialize an attribute tree into its comment-safe JSON payload
pub fn encode_attrs(attrs: &Map<String, Value>) -> String {
    let json = serde_json::to_string(attrs).expect("attribute tree serializes to JSON");
    escape_inner_quotes(&json)
        .replace("--", "\\u002d\\u002d")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Rewrite string-internal escaped quotes as unicode escapes, leaving the
/// structural quotes of the JSON itself alone. A quote is escaped exactly
/// when an odd run of backslashes precedes it; a blind two-character
/// replacement would also hit the closing quote of any string ending in an
/// escaped backslash.
fn escape_inner_quotes(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut run = 0usize;
    for ch in json.chars() {
        match ch {
            '\\' => {
                run += 1;
                out.push(ch);
            }
            '"' if run % 2 == 1 => {
                out.pop();
                out.push_str("\\u0022");
                run = 0;
            }
            _ => {
                run = 0;
                out.push(ch);
            }
        }
    }
    out
}

fn header(tag: &str, attrs: &Map<String, Value>) -> String {
    if attrs.is_empty() {
        tag.to_string()
    } else {
        format!("{tag} {}", encode_attrs(attrs))
    }
}

/// Block with no body
pub fn self_closing(tag: &str, attrs: &Map<String, Value>) -> String {
    format!("<!-- {} /-->", header(tag, attrs))
}

/// Block wrapping an already serialized body
pub fn container(tag: &str, attrs: &Map<String, Value>, body: &str) -> String {
    format!("<!-- {} -->\n{body}\n<!-- /{tag} -->", header(tag, attrs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {other}"),
        }
    }

    #[test]
    fn test_empty_attrs_omit_payload() {
        let map = Map::new();
        assert_eq!(self_closing("builder/text", &map), "<!-- builder/text /-->");
        assert_eq!(
            container("builder/section", &map, "body"),
            "<!-- builder/section -->\nbody\n<!-- /builder/section -->"
        );
    }

    #[test]
    fn test_payload_keys_sorted() {
        let map = attrs(json!({"b": "2", "a": "1"}));
        assert_eq!(
            self_closing("builder/text", &map),
            r#"<!-- builder/text {"a":"1","b":"2"} /-->"#
        );
    }

    #[test]
    fn test_double_dash_escaped() {
        let map = attrs(json!({"color": "var(--gcid-abc123)"}));
        let encoded = encode_attrs(&map);
        assert!(!encoded.contains("--"));
        assert_eq!(encoded, "{\"color\":\"var(\\u002d\\u002dgcid-abc123)\"}");
    }

    #[test]
    fn test_markup_characters_escaped() {
        let map = attrs(json!({"content": {"desktop": {"value": "<b>hi & bye</b>"}}}));
        let encoded = encode_attrs(&map);
        assert!(!encoded.contains('<'));
        assert!(!encoded.contains('>'));
        assert!(!encoded.contains('&'));
        assert!(encoded.contains("\\u003cb\\u003ehi \\u0026 bye\\u003c/b\\u003e"));
    }

    #[test]
    fn test_inner_quotes_escaped() {
        // Only string-internal escaped quotes are rewritten, never the
        // structural quotes of the JSON itself
        let map = attrs(json!({"content": r#"say "hi""#}));
        let encoded = encode_attrs(&map);
        assert_eq!(encoded, "{\"content\":\"say \\u0022hi\\u0022\"}");
    }

    #[test]
    fn test_trailing_backslash_keeps_closing_quote() {
        // "x\" serializes as "x\\" and the closing quote is structural;
        // rewriting it would leave the string unterminated
        let map = attrs(json!({"content": {"desktop": {"value": "x\\"}}}));
        let encoded = encode_attrs(&map);
        assert!(!encoded.contains("u0022"));
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded["content"]["desktop"]["value"], json!("x\\"));
    }

    #[test]
    fn test_numbers_untouched() {
        let map = attrs(json!({"zoom": {"desktop": {"value": -9.5}}}));
        assert_eq!(encode_attrs(&map), r#"{"zoom":{"desktop":{"value":-9.5}}}"#);
    }

    #[test]
    fn test_round_trip_through_json() {
        let map = attrs(json!({"content": "a -- b <i>&</i>"}));
        let encoded = encode_attrs(&map);
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded["content"], json!("a -- b <i>&</i>"));
    }
}
