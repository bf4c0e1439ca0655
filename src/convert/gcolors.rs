//! Global color token substitution
//!
//! Legacy values reference global colors by token id, either as the whole
//! value or embedded inside gradient-stop strings. Active tokens become CSS
//! variable references so later palette edits keep applying; inactive and
//! temporary tokens are frozen to their literal resolved color. Unknown ids
//! pass through untouched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::colors::{ColorStatus, GlobalColorStore};
use crate::formats::shortcode::FlatAttrs;

/// Prefix of store-issued color token ids
pub const COLOR_TOKEN_PREFIX: &str = "gcid-";

/// Attribute collecting the token ids referenced anywhere on a node
pub const GLOBAL_COLORS_INFO_ATTR: &str = "global_colors_info";

/// Gradient-stop attributes scanned for embedded token ids
pub const GRADIENT_STOP_ATTRS: &[&str] = &["background_gradient_stops", "button_background_gradient_stops"];

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"gcid-[0-9a-zA-Z-]+").unwrap());

/// Per-node color substitution context
pub struct ColorSubstituter<'a> {
    store: &'a dyn GlobalColorStore,
    /// Ids listed in the node's color metadata, including pre-prefix legacy
    /// ids the embedded-token pattern cannot find
    node_token_ids: Vec<String>,
}

impl<'a> ColorSubstituter<'a> {
    /// Build the context for one node, reading its color metadata attribute.
    /// Unparsable metadata is treated as empty rather than an error.
    pub fn from_node(store: &'a dyn GlobalColorStore, attrs: &FlatAttrs) -> Self {
        let node_token_ids = attrs
            .get(GLOBAL_COLORS_INFO_ATTR)
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .and_then(|parsed| match parsed {
                Value::Object(map) => Some(map.keys().cloned().collect()),
                _ => None,
            })
            .unwrap_or_default();
        ColorSubstituter {
            store,
            node_token_ids,
        }
    }

    fn replacement(&self, id: &str) -> Option<String> {
        self.store.resolve(id).map(|token| match token.status {
            ColorStatus::Active => format!("var(--{})", token.id),
            ColorStatus::Inactive | ColorStatus::Temporary => token.color,
        })
    }

    /// Substitute color tokens in one attribute value
    pub fn substitute(&self, attr: &str, value: &str) -> String {
        let mut out = if let Some(replaced) = self.replacement(value) {
            replaced
        } else if GRADIENT_STOP_ATTRS.contains(&attr) {
            let mut scanned = TOKEN_PATTERN
                .replace_all(value, |caps: &Captures| {
                    self.replacement(&caps[0]).unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            for id in &self.node_token_ids {
                if !id.starts_with(COLOR_TOKEN_PREFIX) && scanned.contains(id.as_str()) {
                    if let Some(replaced) = self.replacement(id) {
                        scanned = scanned.replace(id.as_str(), &replaced);
                    }
                }
            }
            scanned
        } else {
            value.to_string()
        };

        // Bare custom-property references get wrapped so they stay usable as
        // CSS values
        if out.starts_with("--") {
            out = format!("var({out})");
        }
        out
    }
}
