//! Flat attribute maps and the legacy attribute-string parser

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered flat attribute map.
///
/// Legacy attributes are name/value string pairs. Correctness does not depend
/// on their order, but the order is preserved so conversion output is
/// deterministic for a given input (later duplicates win at path collisions).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatAttrs {
    pairs: Vec<(String, String)>,
}

impl FlatAttrs {
    pub fn new() -> Self {
        FlatAttrs { pairs: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Value of the first attribute with this name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace, keeping the original position on replace
    pub fn set(&mut self, name: &str, value: &str) {
        match self.pairs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.pairs.push((name.to_string(), value.to_string())),
        }
    }

    /// Keep only attributes whose name passes the predicate
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.pairs.retain(|(n, _)| keep(n));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for FlatAttrs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        FlatAttrs {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FlatAttrs {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        FlatAttrs {
            pairs: iter
                .into_iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        }
    }
}

// Matches key="value", key='value' and key=value in that preference order.
static ATTR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([\w-]+)\s*=\s*"([^"]*)"|([\w-]+)\s*=\s*'([^']*)'|([\w-]+)\s*=\s*([^\s"']+)"#)
        .unwrap()
});

/// Parse a raw legacy attribute string into a flat map.
///
/// Values may be double-quoted, single-quoted or bare. Anything that does not
/// look like a name/value pair is ignored; an empty or whitespace-only input
/// yields an empty map rather than an error.
pub fn parse_attrs(raw: &str) -> FlatAttrs {
    let mut attrs = FlatAttrs::new();
    for caps in ATTR_PATTERN.captures_iter(raw) {
        let (name, value) = if let Some(name) = caps.get(1) {
            (name.as_str(), caps.get(2).map_or("", |m| m.as_str()))
        } else if let Some(name) = caps.get(3) {
            (name.as_str(), caps.get(4).map_or("", |m| m.as_str()))
        } else if let Some(name) = caps.get(5) {
            (name.as_str(), caps.get(6).map_or("", |m| m.as_str()))
        } else {
            continue;
        };
        attrs.set(name, value);
    }
    attrs
}
