//! Scalar value cleanup applied to explicitly mapped attributes
//!
//! These are small, targeted repairs for value formats the legacy editor
//! stored differently than the new schema expects. Sanitization never drops
//! data: a value that matches no rule passes through unchanged.

use serde_json::{Number, Value};

/// Percent escapes the legacy editor used to smuggle markup-significant
/// characters through attribute strings
const RESTORE_TABLE: &[(&str, &str)] = &[
    ("%22", "\""),
    ("%92", "\\"),
    ("%5c", "\\"),
    ("%91", "["),
    ("%93", "]"),
];

/// Undo the legacy percent-escape table.
///
/// Values without any escape are returned as-is; the containment scan is a
/// short-circuit for the common case, not a correctness requirement.
pub fn restore_special_chars(value: &str) -> String {
    if !RESTORE_TABLE.iter().any(|(escape, _)| value.contains(escape)) {
        return value.to_string();
    }
    let mut restored = value.to_string();
    for (escape, replacement) in RESTORE_TABLE {
        restored = restored.replace(escape, replacement);
    }
    restored
}

/// Underscore-joined position keywords stored by the legacy editor
const POSITION_TOKENS: &[&str] = &[
    "top_left",
    "top_center",
    "top_right",
    "center_left",
    "center_right",
    "bottom_left",
    "bottom_center",
    "bottom_right",
];

/// Legacy overlay position keywords to CSS-order keyword pairs
const OVERLAY_POSITION_REMAP: &[(&str, &str)] = &[
    ("top_left", "left top"),
    ("top_right", "right top"),
    ("bottom_left", "left bottom"),
    ("bottom_right", "right bottom"),
    ("center", "center center"),
];

/// Attribute names whose values are geographic numbers, by flat or dotted alias
const NUMERIC_ATTRS: &[&str] = &[
    "lat",
    "lng",
    "zoom",
    "zoom_level",
    "address_lat",
    "address_lng",
    "pin.lat",
    "pin.lng",
];

/// Apply per-attribute scalar repairs, keyed by de-suffixed name and
/// component type
pub fn sanitize_value(component: &str, attr: &str, value: &str) -> String {
    match attr {
        "background_position" if POSITION_TOKENS.contains(&value) => value.replace('_', " "),
        "overlay_position" => OVERLAY_POSITION_REMAP
            .iter()
            .find(|(legacy, _)| *legacy == value)
            .map(|(_, css)| css.to_string())
            .unwrap_or_else(|| value.to_string()),
        "gradient_start_position" | "gradient_end_position" if value.parse::<f64>().is_ok() => {
            format!("{value}%")
        }
        attr if attr.starts_with("custom_css_") => value.replace("||", "\n"),
        "fullwidth" if component == "builder/gallery" => {
            if value == "on" { "slider" } else { "grid" }.to_string()
        }
        "text_orientation" if component == "builder/text" && value == "justified" => {
            "justify".to_string()
        }
        "arrangement" if component == "builder/divider" => match value {
            "above_content" => "above".to_string(),
            "below_content" => "below".to_string(),
            _ => value.to_string(),
        },
        _ => value.to_string(),
    }
}

/// Parse allow-listed geographic attributes as floats; everything else, and
/// anything unparsable, stays a string
pub fn coerce_numeric(attr: &str, value: &str) -> Option<Value> {
    if !NUMERIC_ATTRS.contains(&attr) {
        return None;
    }
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
}
