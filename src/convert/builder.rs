//! Flat attribute map to nested attribute tree
//!
//! One pass over the node's attributes in source order. Per attribute: path
//! resolution (which may drop it), universal escape restoration, then either
//! a named expansion or scalar sanitization, then color and dynamic-content
//! substitution on string leaves, then placement by dotted path. Later
//! attributes overwrite earlier ones at the same path, which is intentional
//! for the fan-out expansions.

use serde_json::{Map, Value};

use super::dynamic;
use super::expansions::Expanded;
use super::gcolors::{ColorSubstituter, GLOBAL_COLORS_INFO_ATTR};
use super::paths;
use super::sanitize::{coerce_numeric, restore_special_chars, sanitize_value};
use super::ConversionMap;
use crate::colors::GlobalColorStore;
use crate::formats::shortcode::FlatAttrs;

/// Component whose boolean layout flags are dropped unless switched on
const GALLERY_COMPONENT: &str = "builder/gallery";
const GALLERY_FLAG_ATTRS: &[&str] = &["show_title_and_caption", "show_pagination"];

/// Write `value` at a dotted path, creating intermediate objects on demand.
/// A non-object in the middle of the path is overwritten.
pub fn set_path(tree: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            tree.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = tree
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                set_path(child, rest, value);
            }
        }
    }
}

/// Convert one node's flat attributes into a nested attribute tree.
///
/// Deterministic for a given (attrs, map, color store snapshot) triple;
/// performs no I/O.
pub(crate) fn build_tree(
    component: &str,
    attrs: &FlatAttrs,
    map: &ConversionMap,
    store: &dyn GlobalColorStore,
) -> Map<String, Value> {
    let colors = ColorSubstituter::from_node(store, attrs);
    let mut tree = Map::new();

    for (name, raw) in attrs.iter() {
        // Node-level filters: color metadata is consumed, not emitted, and
        // the gallery layout flags only carry information when on
        if name == GLOBAL_COLORS_INFO_ATTR {
            continue;
        }
        if component == GALLERY_COMPONENT && GALLERY_FLAG_ATTRS.contains(&name) && raw != "on" {
            continue;
        }

        let target = match paths::resolve(name, attrs, map) {
            Some(target) => target,
            None => continue,
        };

        let restored = restore_special_chars(raw);
        let expanded = if let Some(expansion) = map.expansions.get(&target.base) {
            expansion.apply(&restored)
        } else if target.explicit {
            let sanitized = sanitize_value(component, &target.base, &restored);
            match coerce_numeric(&target.base, &sanitized) {
                Some(number) => Expanded::Single(number),
                None => Expanded::Single(Value::String(sanitized)),
            }
        } else {
            Expanded::Single(Value::String(restored))
        };

        match expanded {
            Expanded::Single(value) => {
                place(&mut tree, &target.path, value, &colors, &target.base);
            }
            Expanded::FanOut(pairs) => {
                for (key, value) in pairs {
                    let path = format!("{}.{key}", target.path);
                    place(&mut tree, &path, value, &colors, &target.base);
                }
            }
        }
    }

    tree
}

fn place(
    tree: &mut Map<String, Value>,
    path: &str,
    value: Value,
    colors: &ColorSubstituter<'_>,
    attr: &str,
) {
    let value = match value {
        Value::String(s) => {
            let substituted = colors.substitute(attr, &s);
            Value::String(dynamic::substitute_tokens(&substituted))
        }
        other => other,
    };
    set_path(tree, path, value);
}
