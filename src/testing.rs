//! Testing fixtures: in-memory registry and color store
//!
//! Conversion tests need a component catalog and a color store. Declaring
//! components inline in every test scatters the catalog across the suite and
//! makes registry changes a maintenance chore, so the fixtures live here:
//!
//! - [`StaticRegistry`] / [`StaticColorStore`] are small in-memory
//!   implementations of the host-facing traits, usable with any catalog.
//! - [`sample_registry`] is one curated catalog mirroring a realistic host:
//!   structural layout components, common leaf modules, a shared child tag
//!   whose meaning depends on its parent, and value expansions of every
//!   kind. Tests should reach for it instead of declaring their own
//!   components unless they are exercising registry behavior itself.
//!
//! The catalog's fixed points tests rely on:
//!
//! - `pb_item` is the legacy alias of both `builder/accordion-item` and
//!   `builder/carousel-item`; the accordion variant maps `title` to
//!   `module.advanced.title.*`, the carousel variant to
//!   `module.advanced.slideTitle.*`.
//! - `builder/image` resolves `src` conditionally on the sibling
//!   `fullwidth` flag.
//! - `gcid-abc123` is active, `gcid-dead00` is inactive (`#ff0000`),
//!   `gcid-tmp001` is temporary (`rgba(0,0,0,0.4)`).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::colors::{ColorStatus, GlobalColorStore, GlobalColorToken};
use crate::convert::Converter;
use crate::formats::shortcode::FlatAttrs;
use crate::registry::{
    Capability, ComponentInfo, ComponentRegistry, ConversionOutline, ModuleSchema, SchemaNode,
};

/// In-memory component registry built from explicit entries
#[derive(Default)]
pub struct StaticRegistry {
    components: Vec<ComponentInfo>,
    outlines: BTreeMap<String, ConversionOutline>,
    schemas: BTreeMap<String, ModuleSchema>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        StaticRegistry::default()
    }

    pub fn with_component(mut self, info: ComponentInfo, outline: ConversionOutline) -> Self {
        self.outlines.insert(info.name.clone(), outline);
        self.components.push(info);
        self
    }

    pub fn with_schema(mut self, component: &str, schema: ModuleSchema) -> Self {
        self.schemas.insert(component.to_string(), schema);
        self
    }
}

impl ComponentRegistry for StaticRegistry {
    fn list_components(&self) -> Vec<ComponentInfo> {
        self.components.clone()
    }

    fn conversion_outline(&self, component: &str) -> Option<ConversionOutline> {
        self.outlines.get(component).cloned()
    }

    fn schema(&self, component: &str) -> Option<ModuleSchema> {
        self.schemas.get(component).cloned()
    }
}

/// In-memory global color store built from explicit tokens
#[derive(Default)]
pub struct StaticColorStore {
    tokens: BTreeMap<String, GlobalColorToken>,
}

impl StaticColorStore {
    pub fn new() -> Self {
        StaticColorStore::default()
    }

    pub fn with_token(mut self, token: GlobalColorToken) -> Self {
        self.tokens.insert(token.id.clone(), token);
        self
    }
}

impl GlobalColorStore for StaticColorStore {
    fn resolve(&self, id: &str) -> Option<GlobalColorToken> {
        self.tokens.get(id).cloned()
    }
}

/// The curated sample catalog
pub fn sample_registry() -> StaticRegistry {
    let mut registry = StaticRegistry::new();
    for (info, outline) in catalog() {
        registry = registry.with_component(info, outline);
    }
    let names: Vec<String> = registry.components.iter().map(|c| c.name.clone()).collect();
    for name in names {
        registry = registry.with_schema(&name, default_schema());
    }
    registry
}

/// Color store with one token per lifecycle status
pub fn sample_colors() -> StaticColorStore {
    StaticColorStore::new()
        .with_token(GlobalColorToken::new("gcid-abc123", "#7c3aed", ColorStatus::Active))
        .with_token(GlobalColorToken::new("gcid-dead00", "#ff0000", ColorStatus::Inactive))
        .with_token(GlobalColorToken::new(
            "gcid-tmp001",
            "rgba(0,0,0,0.4)",
            ColorStatus::Temporary,
        ))
}

/// Engine over the sample catalog and color store
pub fn sample_converter() -> Converter {
    Converter::new(Box::new(sample_registry()), Box::new(sample_colors()))
}

fn catalog() -> Vec<(ComponentInfo, ConversionOutline)> {
    vec![
        (
            ComponentInfo::new("builder/section", "pb_section", &["builder/row"]),
            ConversionOutline::default(),
        ),
        (
            ComponentInfo::new("builder/row", "pb_row", &["builder/column"]),
            ConversionOutline::default(),
        ),
        (
            ComponentInfo::new(
                "builder/column",
                "pb_column",
                &[
                    "builder/accordion",
                    "builder/blurb",
                    "builder/button",
                    "builder/carousel",
                    "builder/divider",
                    "builder/gallery",
                    "builder/image",
                    "builder/map",
                    "builder/text",
                ],
            ),
            ConversionOutline::default(),
        ),
        (ComponentInfo::new("builder/text", "pb_text", &[]), text_outline()),
        (ComponentInfo::new("builder/image", "pb_image", &[]), image_outline()),
        (ComponentInfo::new("builder/blurb", "pb_blurb", &[]), blurb_outline()),
        (ComponentInfo::new("builder/gallery", "pb_gallery", &[]), gallery_outline()),
        (ComponentInfo::new("builder/map", "pb_map", &[]), map_outline()),
        (
            ComponentInfo::new("builder/divider", "pb_divider", &[]),
            divider_outline(),
        ),
        (
            ComponentInfo::new("builder/button", "pb_button", &[]),
            ConversionOutline::default(),
        ),
        (
            ComponentInfo::new("builder/accordion", "pb_accordion", &["builder/accordion-item"]),
            ConversionOutline::default(),
        ),
        (
            ComponentInfo::new("builder/accordion-item", "pb_item", &[]),
            accordion_item_outline(),
        ),
        (
            ComponentInfo::new("builder/carousel", "pb_carousel", &["builder/carousel-item"]),
            ConversionOutline::default(),
        ),
        (
            ComponentInfo::new("builder/carousel-item", "pb_item", &[]),
            carousel_item_outline(),
        ),
    ]
}

fn text_outline() -> ConversionOutline {
    let mut outline = ConversionOutline::default();
    outline
        .structural_attribute_map
        .insert("font_families".to_string(), "module.advanced.fonts.*".to_string());
    outline
        .value_expansion_overrides
        .insert("font_families".to_string(), "font_list".to_string());
    outline
}

fn image_outline() -> ConversionOutline {
    let mut outline = ConversionOutline::default();
    outline.conditional_map.insert(
        "src".to_string(),
        Arc::new(|attrs: &FlatAttrs| {
            if attrs.get("fullwidth") == Some("on") {
                "module.advanced.fullwidthImage.*.url".to_string()
            } else {
                "module.advanced.image.*.url".to_string()
            }
        }),
    );
    outline
}

fn blurb_outline() -> ConversionOutline {
    let mut outline = ConversionOutline::default();
    outline
        .structural_attribute_map
        .insert("font_icon".to_string(), "module.advanced.icon.*".to_string());
    outline
        .structural_attribute_map
        .insert("use_icon".to_string(), "module.advanced.useIcon.*".to_string());
    outline
        .structural_attribute_map
        .insert("image_icon_width".to_string(), "module.advanced.width.*".to_string());
    outline
        .value_expansion_overrides
        .insert("font_icon".to_string(), "icon".to_string());
    outline
        .value_expansion_overrides
        .insert("use_icon".to_string(), "boolean".to_string());
    outline
        .value_expansion_overrides
        .insert("image_icon_width".to_string(), "width_fanout".to_string());
    outline
}

fn gallery_outline() -> ConversionOutline {
    let mut outline = ConversionOutline::default();
    outline
        .structural_attribute_map
        .insert("fullwidth".to_string(), "module.advanced.layout.*".to_string());
    outline
        .structural_attribute_map
        .insert("gallery_items".to_string(), "module.advanced.items.*".to_string());
    outline
        .value_expansion_overrides
        .insert("gallery_items".to_string(), "options_list".to_string());
    outline
}

fn map_outline() -> ConversionOutline {
    let mut outline = ConversionOutline::default();
    outline
        .structural_attribute_map
        .insert("zoom_level".to_string(), "module.advanced.map.*.zoom".to_string());
    outline
        .structural_attribute_map
        .insert("address_lat".to_string(), "module.advanced.map.*.lat".to_string());
    outline
        .structural_attribute_map
        .insert("address_lng".to_string(), "module.advanced.map.*.lng".to_string());
    outline
}

fn divider_outline() -> ConversionOutline {
    let mut outline = ConversionOutline::default();
    outline
        .structural_attribute_map
        .insert("arrangement".to_string(), "module.advanced.line.*.arrangement".to_string());
    outline
}

fn accordion_item_outline() -> ConversionOutline {
    let mut outline = ConversionOutline::default();
    outline
        .structural_attribute_map
        .insert("title".to_string(), "module.advanced.title.*".to_string());
    outline
}

fn carousel_item_outline() -> ConversionOutline {
    let mut outline = ConversionOutline::default();
    outline
        .structural_attribute_map
        .insert("title".to_string(), "module.advanced.slideTitle.*".to_string());
    outline
}

fn default_schema() -> ModuleSchema {
    ModuleSchema::new(vec![
        (
            "module",
            SchemaNode::group(vec![
                ("decoration", SchemaNode::leaf(&[Capability::Style])),
                ("advanced", SchemaNode::leaf(&[Capability::Style])),
            ]),
        ),
        ("adminLabel", SchemaNode::leaf(&[Capability::Content])),
        ("content", SchemaNode::leaf(&[Capability::Content])),
        ("css", SchemaNode::leaf(&[Capability::Style])),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_registry_catalog() {
        let registry = sample_registry();
        let components = registry.list_components();
        assert!(components.iter().any(|c| c.name == "builder/section"));

        let shared: Vec<&ComponentInfo> = components
            .iter()
            .filter(|c| c.legacy_alias == "pb_item")
            .collect();
        assert_eq!(shared.len(), 2);

        assert!(registry.conversion_outline("builder/text").is_some());
        assert!(registry.schema("builder/text").is_some());
        assert!(registry.conversion_outline("builder/unknown").is_none());
    }

    #[test]
    fn test_sample_colors_statuses() {
        let colors = sample_colors();
        assert_eq!(
            colors.resolve("gcid-abc123").map(|t| t.status),
            Some(ColorStatus::Active)
        );
        assert_eq!(
            colors.resolve("gcid-dead00").map(|t| t.color),
            Some("#ff0000".to_string())
        );
        assert!(colors.resolve("gcid-nope").is_none());
    }
}
