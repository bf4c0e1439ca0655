//! Attribute name decomposition and target path resolution
//!
//! Legacy attribute names encode their viewport and interaction state as
//! suffixes on a base name (`padding_tablet`, `background_color__hover`).
//! Resolution strips one suffix, checks the matching enable flag, looks up
//! the base name's path template and substitutes the concrete
//! `{viewport}.{state}` pair for the template placeholder. Names with no
//! template fall through a fixed ladder of fallbacks ending in
//! `unknownAttributes.*`, so unrecognized data is preserved rather than
//! silently lost. Disabled responsive, hover and sticky variants are noise
//! left behind by the legacy editor and are dropped outright.

use super::ConversionMap;
use crate::formats::shortcode::FlatAttrs;

/// Placeholder in path templates standing for `{viewport}.{state}`
pub const PATH_PLACEHOLDER: char = '*';

/// Target viewport of a resolved attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Desktop,
    Tablet,
    Phone,
}

impl Viewport {
    pub fn token(self) -> &'static str {
        match self {
            Viewport::Desktop => "desktop",
            Viewport::Tablet => "tablet",
            Viewport::Phone => "phone",
        }
    }
}

/// Target interaction state of a resolved attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantState {
    Value,
    Hover,
    Sticky,
}

impl VariantState {
    pub fn token(self) -> &'static str {
        match self {
            VariantState::Value => "value",
            VariantState::Hover => "hover",
            VariantState::Sticky => "sticky",
        }
    }
}

/// Variant suffix carried by a legacy attribute name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    None,
    Tablet,
    Phone,
    Hover,
    Sticky,
}

impl Suffix {
    /// Suffixes carrying a literal, longest first so `__hover` is never
    /// misread as a name ending in `_hover`
    const STRIPPABLE: [Suffix; 4] = [Suffix::Sticky, Suffix::Hover, Suffix::Tablet, Suffix::Phone];

    pub fn literal(self) -> &'static str {
        match self {
            Suffix::None => "",
            Suffix::Tablet => "_tablet",
            Suffix::Phone => "_phone",
            Suffix::Hover => "__hover",
            Suffix::Sticky => "__sticky",
        }
    }

    /// Split a name into its base and at most one variant suffix
    pub fn strip(name: &str) -> (&str, Suffix) {
        for suffix in Suffix::STRIPPABLE {
            if let Some(base) = name.strip_suffix(suffix.literal()) {
                if !base.is_empty() {
                    return (base, suffix);
                }
            }
        }
        (name, Suffix::None)
    }

    /// Inverse of [`Suffix::strip`]
    pub fn attach(self, base: &str) -> String {
        format!("{base}{}", self.literal())
    }
}

/// Bookkeeping attributes dropped before any other resolution step
const DROP_ATTRS: &[&str] = &["_i", "_address", "_dynamic_attributes"];

/// Enable-flag suffixes; the flags gate other attributes and never convert
const ENABLE_FLAG_SUFFIXES: &[&str] = &["_last_edited", "__hover_enabled", "__sticky_enabled"];

/// Metadata names mapping to `camelCase(name).*` when no template exists
const RESPONSIVE_META_ATTRS: &[&str] = &["admin_label", "content", "module_class", "module_id"];

/// Marker names mapping to flat `camelCase(name)` paths
const FLAT_META_ATTRS: &[&str] = &["do_not_convert", "global_module", "shortcode_name"];

pub(crate) fn is_bookkeeping(name: &str) -> bool {
    DROP_ATTRS.contains(&name) || ENABLE_FLAG_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Lower snake_case to camelCase; leading/trailing underscores collapse
pub(crate) fn camel_case(name: &str) -> String {
    let mut parts = name.split('_').filter(|p| !p.is_empty());
    let mut out = String::with_capacity(name.len());
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        let mut chars = part.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Successful resolution of one legacy attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// Fully substituted dotted target path
    pub path: String,
    /// De-suffixed legacy name, the key for value transforms
    pub base: String,
    /// True when the path came from an explicit mapping rather than a
    /// fallback rule; only explicit targets get scalar sanitization
    pub explicit: bool,
}

/// Name of the flag gating responsive variants of `base`
fn enable_base<'a>(base: &'a str, map: &'a ConversionMap) -> &'a str {
    map.option_enables
        .get(base)
        .map(|s| s.as_str())
        .unwrap_or(base)
}

fn flag_on(attrs: &FlatAttrs, flag: &str) -> bool {
    attrs.get(flag).is_some_and(|v| v.starts_with("on"))
}

fn responsive_enabled(base: &str, attrs: &FlatAttrs, map: &ConversionMap) -> bool {
    flag_on(attrs, &format!("{}_last_edited", enable_base(base, map)))
}

fn hover_enabled(base: &str, attrs: &FlatAttrs, map: &ConversionMap) -> bool {
    flag_on(attrs, &format!("{}__hover_enabled", enable_base(base, map)))
}

fn sticky_enabled(base: &str, attrs: &FlatAttrs, map: &ConversionMap) -> bool {
    flag_on(attrs, &format!("{}__sticky_enabled", enable_base(base, map)))
}

fn is_positioned(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v != "none")
}

/// Breakpoint at which the node is actually stuck, if any.
///
/// Sticky state is derived from the `sticky_position` family rather than a
/// plain flag: when that family is responsive-enabled the first positioned
/// breakpoint wins in phone, tablet, desktop priority; otherwise only the
/// desktop value counts.
fn active_sticky_viewport(attrs: &FlatAttrs, map: &ConversionMap) -> Option<Viewport> {
    if responsive_enabled("sticky_position", attrs, map) {
        for (viewport, attr) in [
            (Viewport::Phone, "sticky_position_phone"),
            (Viewport::Tablet, "sticky_position_tablet"),
            (Viewport::Desktop, "sticky_position"),
        ] {
            if is_positioned(attrs.get(attr)) {
                return Some(viewport);
            }
        }
        None
    } else if is_positioned(attrs.get("sticky_position")) {
        Some(Viewport::Desktop)
    } else {
        None
    }
}

/// Resolve one legacy attribute name to its target path, or `None` to drop it
pub fn resolve(name: &str, attrs: &FlatAttrs, map: &ConversionMap) -> Option<ResolvedTarget> {
    if is_bookkeeping(name) {
        return None;
    }

    let (base, suffix) = Suffix::strip(name);
    let (viewport, state) = match suffix {
        Suffix::None => (Viewport::Desktop, VariantState::Value),
        Suffix::Tablet => {
            if !responsive_enabled(base, attrs, map) {
                return None;
            }
            (Viewport::Tablet, VariantState::Value)
        }
        Suffix::Phone => {
            if !responsive_enabled(base, attrs, map) {
                return None;
            }
            (Viewport::Phone, VariantState::Value)
        }
        Suffix::Hover => {
            if !hover_enabled(base, attrs, map) {
                return None;
            }
            (Viewport::Desktop, VariantState::Hover)
        }
        Suffix::Sticky => {
            if !sticky_enabled(base, attrs, map) {
                return None;
            }
            let viewport = active_sticky_viewport(attrs, map)?;
            (viewport, VariantState::Sticky)
        }
    };

    let (template, explicit) = if let Some(callback) = map.conditional_paths.get(base) {
        (callback(attrs), true)
    } else if let Some(template) = map.attribute_map.get(base) {
        (template.clone(), true)
    } else if RESPONSIVE_META_ATTRS.contains(&base) {
        (format!("{}.{PATH_PLACEHOLDER}", camel_case(base)), false)
    } else if FLAT_META_ATTRS.contains(&base) {
        (camel_case(base), false)
    } else if let Some(internal) = base.strip_prefix('_') {
        (camel_case(internal), false)
    } else {
        (format!("unknownAttributes.{base}"), false)
    };

    let concrete = format!("{}.{}", viewport.token(), state.token());
    let path = template.replace(PATH_PLACEHOLDER, &concrete);

    Some(ResolvedTarget {
        path,
        base: base.to_string(),
        explicit,
    })
}
