//! Named value expansions
//!
//! Legacy values pack structure into delimited strings. An expansion
//! reinterprets one such string as either a single target value (possibly an
//! array) or a fan-out of sub-key/value pairs placed beneath the resolved
//! path. The set is closed: components reference expansions by id, and ids
//! are resolved to variants when the conversion map is composed, so an
//! unknown id fails registration instead of surfacing mid-document.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::sanitize::restore_special_chars;

/// Legacy icon code points addressed by the `%%N%%` index shorthand
const LEGACY_ICON_CODEPOINTS: &[&str] = &[
    "&#x21;", "&#x22;", "&#x23;", "&#x24;", "&#x25;", "&#x26;", "&#x27;", "&#x28;", "&#x29;",
    "&#x2a;", "&#x2b;", "&#x2c;", "&#x2d;", "&#x2e;", "&#x2f;", "&#x30;",
];

static ICON_INDEX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%%(\d+)%%$").unwrap());

/// Result of applying an expansion to one raw value
#[derive(Debug, Clone, PartialEq)]
pub enum Expanded {
    /// One value for the resolved path itself
    Single(Value),
    /// Sub-key suffix to value pairs, each placed at `path.{key}`
    FanOut(Vec<(&'static str, Value)>),
}

/// Closed set of value-expansion transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// Pipe-delimited spacing shorthand into side and sync-flag sub-keys
    Spacing,
    /// `unicode||type||weight` icon shorthand into sub-keys
    Icon,
    /// Comma-separated font family list into an array
    FontList,
    /// `"true"` into `"on"`, anything else into `"off"`
    Boolean,
    /// URL-encoded JSON list into an array with id fields coerced to strings
    OptionsList,
    /// One value duplicated under `image` and `icon` sub-keys
    WidthFanout,
}

impl Expansion {
    /// Resolve a registration id to its expansion
    pub fn from_id(id: &str) -> Option<Expansion> {
        match id {
            "spacing" => Some(Expansion::Spacing),
            "icon" => Some(Expansion::Icon),
            "font_list" => Some(Expansion::FontList),
            "boolean" => Some(Expansion::Boolean),
            "options_list" => Some(Expansion::OptionsList),
            "width_fanout" => Some(Expansion::WidthFanout),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Expansion::Spacing => "spacing",
            Expansion::Icon => "icon",
            Expansion::FontList => "font_list",
            Expansion::Boolean => "boolean",
            Expansion::OptionsList => "options_list",
            Expansion::WidthFanout => "width_fanout",
        }
    }

    pub fn apply(self, value: &str) -> Expanded {
        match self {
            Expansion::Spacing => spacing(value),
            Expansion::Icon => icon(value),
            Expansion::FontList => font_list(value),
            Expansion::Boolean => boolean(value),
            Expansion::OptionsList => options_list(value),
            Expansion::WidthFanout => Expanded::FanOut(vec![
                ("image", Value::String(value.to_string())),
                ("icon", Value::String(value.to_string())),
            ]),
        }
    }
}

/// Spacing shorthand: `top|right|bottom|left|syncV|syncH`.
///
/// A stray leading `on`/`off` enable marker is skipped. Missing trailing
/// fields become empty strings so every sub-key is always present. The sync
/// flags only recognize `"true"` as set.
fn spacing(value: &str) -> Expanded {
    let mut parts: Vec<&str> = value.split('|').collect();
    if parts.first().is_some_and(|p| *p == "on" || *p == "off") {
        parts.remove(0);
    }
    let side = |i: usize| Value::String(parts.get(i).copied().unwrap_or("").to_string());
    let flag = |i: usize| {
        let set = parts.get(i).copied() == Some("true");
        Value::String(if set { "on" } else { "off" }.to_string())
    };
    Expanded::FanOut(vec![
        ("top", side(0)),
        ("right", side(1)),
        ("bottom", side(2)),
        ("left", side(3)),
        ("syncVertical", flag(4)),
        ("syncHorizontal", flag(5)),
    ])
}

fn icon(value: &str) -> Expanded {
    let mut parts = value.split("||");
    let unicode_part = parts.next().unwrap_or("");
    let type_part = parts.next().unwrap_or("");
    let weight_part = parts.next().unwrap_or("");

    let unicode = if let Some(caps) = ICON_INDEX_PATTERN.captures(unicode_part) {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|i| LEGACY_ICON_CODEPOINTS.get(i))
            .map(|cp| cp.to_string())
    } else if unicode_part.is_empty() {
        None
    } else {
        Some(unicode_part.to_string())
    };

    let mut pairs = Vec::new();
    if let Some(unicode) = unicode {
        pairs.push(("unicode", Value::String(unicode)));
    }
    if !type_part.is_empty() {
        pairs.push(("type", Value::String(type_part.to_string())));
    }
    if !weight_part.is_empty() {
        pairs.push(("weight", Value::String(weight_part.to_string())));
    }
    Expanded::FanOut(pairs)
}

fn font_list(value: &str) -> Expanded {
    let families: Vec<Value> = value
        .split(',')
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(|f| Value::String(f.to_string()))
        .collect();
    Expanded::Single(Value::Array(families))
}

fn boolean(value: &str) -> Expanded {
    let flag = if value == "true" { "on" } else { "off" };
    Expanded::Single(Value::String(flag.to_string()))
}

/// Sortable list: percent-restored, URL-decoded, JSON-decoded. The legacy
/// editor stored numeric `id`/`dragID` fields inconsistently, so both are
/// coerced to strings. Any decode failure keeps the raw value untouched.
fn options_list(value: &str) -> Expanded {
    let restored = restore_special_chars(value);
    let decoded = match urlencoding::decode(&restored) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => return Expanded::Single(Value::String(value.to_string())),
    };
    let parsed: Value = match serde_json::from_str(&decoded) {
        Ok(parsed) => parsed,
        Err(_) => return Expanded::Single(Value::String(value.to_string())),
    };
    let items = match parsed {
        Value::Array(items) => items,
        _ => return Expanded::Single(Value::String(value.to_string())),
    };

    let coerced = items
        .into_iter()
        .map(|mut item| {
            if let Value::Object(fields) = &mut item {
                coerce_to_string(fields, "id");
                coerce_to_string(fields, "dragID");
            }
            item
        })
        .collect();
    Expanded::Single(Value::Array(coerced))
}

fn coerce_to_string(fields: &mut Map<String, Value>, key: &str) {
    if let Some(value) = fields.get(key) {
        if !value.is_string() {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            fields.insert(key.to_string(), Value::String(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fan_out(expanded: Expanded) -> Vec<(&'static str, Value)> {
        match expanded {
            Expanded::FanOut(pairs) => pairs,
            other => panic!("Expected fan-out, got {other:?}"),
        }
    }

    fn single(expanded: Expanded) -> Value {
        match expanded {
            Expanded::Single(value) => value,
            other => panic!("Expected single value, got {other:?}"),
        }
    }

    #[test]
    fn test_from_id_round_trips() {
        for expansion in [
            Expansion::Spacing,
            Expansion::Icon,
            Expansion::FontList,
            Expansion::Boolean,
            Expansion::OptionsList,
            Expansion::WidthFanout,
        ] {
            assert_eq!(Expansion::from_id(expansion.id()), Some(expansion));
        }
        assert_eq!(Expansion::from_id("glyph"), None);
    }

    #[test]
    fn test_spacing_three_fields() {
        let pairs = fan_out(Expansion::Spacing.apply("5px|10px|15px"));
        assert_eq!(
            pairs,
            vec![
                ("top", json!("5px")),
                ("right", json!("10px")),
                ("bottom", json!("15px")),
                ("left", json!("")),
                ("syncVertical", json!("off")),
                ("syncHorizontal", json!("off")),
            ]
        );
    }

    #[test]
    fn test_spacing_skips_leading_marker() {
        let pairs = fan_out(Expansion::Spacing.apply("on||"));
        assert_eq!(
            pairs,
            vec![
                ("top", json!("")),
                ("right", json!("")),
                ("bottom", json!("")),
                ("left", json!("")),
                ("syncVertical", json!("off")),
                ("syncHorizontal", json!("off")),
            ]
        );
    }

    #[test]
    fn test_spacing_sync_flags() {
        let pairs = fan_out(Expansion::Spacing.apply("1px|2px|3px|4px|true|false"));
        assert_eq!(pairs[4], ("syncVertical", json!("on")));
        assert_eq!(pairs[5], ("syncHorizontal", json!("off")));
    }

    #[test]
    fn test_icon_full() {
        let pairs = fan_out(Expansion::Icon.apply("&#x34;||divi||400"));
        assert_eq!(
            pairs,
            vec![
                ("unicode", json!("&#x34;")),
                ("type", json!("divi")),
                ("weight", json!("400")),
            ]
        );
    }

    #[test]
    fn test_icon_index_lookup() {
        let pairs = fan_out(Expansion::Icon.apply("%%3%%||divi"));
        assert_eq!(pairs[0], ("unicode", json!("&#x24;")));
        assert_eq!(pairs[1], ("type", json!("divi")));
    }

    #[test]
    fn test_icon_index_out_of_range_omitted() {
        let pairs = fan_out(Expansion::Icon.apply("%%999%%||divi"));
        assert_eq!(pairs, vec![("type", json!("divi"))]);
    }

    #[test]
    fn test_icon_missing_parts_omitted() {
        let pairs = fan_out(Expansion::Icon.apply("&#x21;"));
        assert_eq!(pairs, vec![("unicode", json!("&#x21;"))]);
    }

    #[test]
    fn test_font_list() {
        let value = single(Expansion::FontList.apply("Georgia, Times New Roman,serif"));
        assert_eq!(value, json!(["Georgia", "Times New Roman", "serif"]));
    }

    #[test]
    fn test_font_list_empty() {
        assert_eq!(single(Expansion::FontList.apply("")), json!([]));
    }

    #[test]
    fn test_boolean_literal_true_only() {
        assert_eq!(single(Expansion::Boolean.apply("true")), json!("on"));
        assert_eq!(single(Expansion::Boolean.apply("false")), json!("off"));
        assert_eq!(single(Expansion::Boolean.apply("")), json!("off"));
    }

    #[test]
    fn test_options_list_decodes_and_coerces() {
        let encoded = "%5B%7B%22id%22%3A3%2C%22dragID%22%3A10%2C%22label%22%3A%22A%22%7D%5D";
        let value = single(Expansion::OptionsList.apply(encoded));
        assert_eq!(value, json!([{"id": "3", "dragID": "10", "label": "A"}]));
    }

    #[test]
    fn test_options_list_bad_json_passes_through() {
        let value = single(Expansion::OptionsList.apply("not json"));
        assert_eq!(value, json!("not json"));
    }

    #[test]
    fn test_options_list_non_array_passes_through() {
        let value = single(Expansion::OptionsList.apply("%7B%22id%22%3A1%7D"));
        assert_eq!(value, json!("%7B%22id%22%3A1%7D"));
    }

    #[test]
    fn test_width_fanout() {
        let pairs = fan_out(Expansion::WidthFanout.apply("64px"));
        assert_eq!(pairs, vec![("image", json!("64px")), ("icon", json!("64px"))]);
    }
}
