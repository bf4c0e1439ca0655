//! Conversion engine
//!
//! `Converter` wires the pieces together: it parses legacy markup with the
//! registry-derived tag set, runs every node's attributes through path
//! resolution and value transforms, and re-serializes the result as nested
//! blocks. It owns two process-lifetime caches, the composed `ConversionMap`
//! and the preset attribute map, both keyed by component type name. All
//! registry and color-store lookups are synchronous; a conversion pass is
//! strictly sequential and touches no state outside these caches.

pub mod builder;
pub mod dynamic;
pub mod expansions;
pub mod gcolors;
pub mod paths;
pub mod sanitize;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::colors::GlobalColorStore;
use crate::error::{ConvertError, ConvertResult};
use crate::formats::block::writer::{container, self_closing};
use crate::formats::block::{LEGACY_REGION_TAG, OPAQUE_COMPONENT};
use crate::formats::shortcode::{
    Content, FlatAttrs, ShortcodeNode, ShortcodeParser, TagSet, GLOBAL_MODULE_ATTR,
};
use crate::presets::{self, PresetAttributeMap};
use crate::registry::{ComponentRegistry, ConditionalPath, ConversionOutline};
use expansions::Expansion;

/// Advanced option paths shared by every component type
pub(crate) const ADVANCED_OPTION_MAP: &[(&str, &str)] = &[
    ("animation_duration", "module.decoration.animation.*.duration"),
    ("animation_style", "module.decoration.animation.*.style"),
    ("background_color", "module.decoration.background.*.color"),
    ("background_gradient_stops", "module.decoration.background.*.gradient.stops"),
    ("background_image", "module.decoration.background.*.image.url"),
    ("background_position", "module.decoration.background.*.image.position"),
    ("border_radii", "module.decoration.border.*.radius"),
    ("border_styles", "module.decoration.border.*.styles"),
    ("box_shadow_color", "module.decoration.boxShadow.*.color"),
    ("box_shadow_style", "module.decoration.boxShadow.*.style"),
    ("custom_css_after", "css.*.after"),
    ("custom_css_before", "css.*.before"),
    ("custom_css_free_form", "css.*.freeForm"),
    ("custom_css_main_element", "css.*.mainElement"),
    ("disabled_on", "module.decoration.disabledOn.*"),
    ("gradient_end_position", "module.decoration.background.*.gradient.end"),
    ("gradient_start_position", "module.decoration.background.*.gradient.start"),
    ("hover_transition_delay", "module.decoration.transition.*.delay"),
    ("hover_transition_duration", "module.decoration.transition.*.duration"),
    ("margin", "module.decoration.margin.*"),
    ("overflow_x", "module.decoration.overflow.*.x"),
    ("overflow_y", "module.decoration.overflow.*.y"),
    ("overlay_position", "module.decoration.overlay.*.position"),
    ("padding", "module.decoration.spacing.*"),
    ("sticky_offset_top", "module.decoration.sticky.*.offset.top"),
    ("sticky_position", "module.decoration.sticky.*.position"),
    ("text_orientation", "module.advanced.text.text.*.orientation"),
    ("z_index", "module.decoration.zIndex.*"),
];

/// Attribute groups sharing one responsive/hover/sticky enable flag
pub(crate) const SHARED_ENABLE_FLAGS: &[(&str, &str)] = &[
    ("background_color", "background"),
    ("background_gradient_stops", "background"),
    ("background_image", "background"),
    ("background_position", "background"),
    ("border_radii", "border"),
    ("border_styles", "border"),
    ("gradient_end_position", "background"),
    ("gradient_start_position", "background"),
];

/// Expansions every component gets without declaring them
const CORE_EXPANSIONS: &[(&str, Expansion)] =
    &[("margin", Expansion::Spacing), ("padding", Expansion::Spacing)];

/// Composed per-component conversion schema.
///
/// Built once per component type from the fixed advanced-option tables plus
/// the registry outline, then cached for process lifetime. Expansion ids are
/// resolved here, eagerly, so broken registrations fail fast.
#[derive(Default, Clone)]
pub struct ConversionMap {
    pub attribute_map: BTreeMap<String, String>,
    pub option_enables: BTreeMap<String, String>,
    pub expansions: BTreeMap<String, Expansion>,
    pub conditional_paths: BTreeMap<String, ConditionalPath>,
}

impl ConversionMap {
    /// The engine-declared portion shared by every component
    pub(crate) fn base() -> ConversionMap {
        let mut map = ConversionMap::default();
        for (attr, template) in ADVANCED_OPTION_MAP {
            map.attribute_map
                .insert(attr.to_string(), template.to_string());
        }
        for (attr, flag) in SHARED_ENABLE_FLAGS {
            map.option_enables.insert(attr.to_string(), flag.to_string());
        }
        for (attr, expansion) in CORE_EXPANSIONS {
            map.expansions.insert(attr.to_string(), *expansion);
        }
        map
    }

    pub(crate) fn compose(
        component: &str,
        outline: &ConversionOutline,
    ) -> ConvertResult<ConversionMap> {
        let mut map = ConversionMap::base();
        for (attr, template) in &outline.advanced_option_overrides {
            map.attribute_map.insert(attr.clone(), template.clone());
        }
        for (attr, template) in &outline.structural_attribute_map {
            map.attribute_map.insert(attr.clone(), template.clone());
        }
        for (attr, id) in &outline.value_expansion_overrides {
            let expansion =
                Expansion::from_id(id).ok_or_else(|| ConvertError::UnknownTransform {
                    component: component.to_string(),
                    attr: attr.clone(),
                    transform: id.clone(),
                })?;
            map.expansions.insert(attr.clone(), expansion);
        }
        map.conditional_paths = outline.conditional_map.clone();
        Ok(map)
    }
}

static EMBEDDED_REGION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let tag = regex::escape(LEGACY_REGION_TAG);
    Regex::new(&format!(r"(?s)<!--\s*{tag}\s*-->(.*?)<!--\s*/{tag}\s*-->")).unwrap()
});

/// Legacy-to-block conversion engine
pub struct Converter {
    registry: Box<dyn ComponentRegistry>,
    colors: Box<dyn GlobalColorStore>,
    extra_tags: Vec<String>,
    tags: Option<Arc<TagSet>>,
    maps: HashMap<String, Arc<ConversionMap>>,
    preset_maps: HashMap<String, Arc<PresetAttributeMap>>,
}

impl Converter {
    pub fn new(registry: Box<dyn ComponentRegistry>, colors: Box<dyn GlobalColorStore>) -> Self {
        Converter {
            registry,
            colors,
            extra_tags: Vec::new(),
            tags: None,
            maps: HashMap::new(),
            preset_maps: HashMap::new(),
        }
    }

    /// Add externally supplied tags the parser should recognize. Tags with
    /// no registered component convert to opaque pass-through nodes. May be
    /// called once per source list; the lists are merged.
    pub fn with_extra_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.extra_tags.extend(tags.into_iter().map(Into::into));
        self.tags = None;
        self
    }

    /// Convert a whole legacy document into block markup
    pub fn convert_document(&mut self, source: &str) -> ConvertResult<String> {
        let tags = self.tag_set();
        let nodes = ShortcodeParser::new(&tags).parse(source);
        self.serialize_nodes(&tags, &nodes, None)
    }

    /// Convert the legacy regions of an already partially converted
    /// document, preserving every byte outside the delimited regions.
    /// A document with no legacy region is returned unchanged.
    pub fn convert_embedded_regions(&mut self, source: &str) -> ConvertResult<String> {
        let mut out = String::with_capacity(source.len());
        let mut last = 0;
        for caps in EMBEDDED_REGION_PATTERN.captures_iter(source) {
            let whole = caps.get(0).unwrap();
            let inner = caps.get(1).map_or("", |m| m.as_str());
            out.push_str(&source[last..whole.start()]);
            out.push_str(&self.convert_document(inner)?);
            last = whole.end();
        }
        out.push_str(&source[last..]);
        Ok(out)
    }

    /// Convert one flat attribute map against a component's conversion map.
    /// This is the map-to-map surface the preset pipeline and hosts with
    /// their own node model call directly.
    pub fn convert_attributes(
        &mut self,
        component: &str,
        attrs: &FlatAttrs,
    ) -> ConvertResult<Map<String, Value>> {
        let map = self.conversion_map(component)?;
        Ok(builder::build_tree(component, attrs, &map, self.colors.as_ref()))
    }

    /// Convert a stored preset bundle; see [`crate::presets`]
    pub fn convert_presets(&mut self, store: &Value) -> ConvertResult<Value> {
        presets::convert_presets(self, store)
    }

    pub(crate) fn conversion_map(&mut self, component: &str) -> ConvertResult<Arc<ConversionMap>> {
        if let Some(map) = self.maps.get(component) {
            return Ok(Arc::clone(map));
        }
        let map = if component == OPAQUE_COMPONENT {
            // The opaque wrapper is engine-owned; its attributes are all
            // marker metadata resolved by fallback rules
            ConversionMap::base()
        } else {
            let outline = self
                .registry
                .conversion_outline(component)
                .ok_or_else(|| ConvertError::MissingOutline(component.to_string()))?;
            ConversionMap::compose(component, &outline)?
        };
        let map = Arc::new(map);
        self.maps.insert(component.to_string(), Arc::clone(&map));
        Ok(map)
    }

    pub(crate) fn preset_map(&mut self, component: &str) -> ConvertResult<Arc<PresetAttributeMap>> {
        if let Some(map) = self.preset_maps.get(component) {
            return Ok(Arc::clone(map));
        }
        let schema = self
            .registry
            .schema(component)
            .ok_or_else(|| ConvertError::MissingSchema(component.to_string()))?;
        let map = Arc::new(PresetAttributeMap::derive(&schema));
        self.preset_maps.insert(component.to_string(), Arc::clone(&map));
        Ok(map)
    }

    pub(crate) fn tag_set(&mut self) -> Arc<TagSet> {
        if let Some(tags) = &self.tags {
            return Arc::clone(tags);
        }
        let tags = Arc::new(TagSet::new(
            self.registry.list_components(),
            &self.extra_tags,
        ));
        self.tags = Some(Arc::clone(&tags));
        tags
    }

    /// Component name a preset or document node converts to, resolving the
    /// legacy alias with optional parent context
    pub(crate) fn resolve_component(
        &mut self,
        tag: &str,
        parent_tag: Option<&str>,
    ) -> Option<String> {
        let tags = self.tag_set();
        tags.resolve(tag, parent_tag).map(|info| info.name.clone())
    }

    fn serialize_nodes(
        &mut self,
        tags: &TagSet,
        nodes: &[ShortcodeNode],
        shared_id: Option<&str>,
    ) -> ConvertResult<String> {
        let mut blocks = Vec::with_capacity(nodes.len());
        for node in nodes {
            blocks.push(self.serialize_node(tags, node, shared_id)?);
        }
        Ok(blocks.join("\n\n"))
    }

    /// Serialize one node depth-first. A shared global instance id is taken
    /// from the nearest ancestor that carries one and propagated to every
    /// descendant unchanged.
    fn serialize_node(
        &mut self,
        tags: &TagSet,
        node: &ShortcodeNode,
        inherited: Option<&str>,
    ) -> ConvertResult<String> {
        let shared_id = inherited.or_else(|| node.attrs.get(GLOBAL_MODULE_ATTR));

        let component = if node.is_convertible {
            tags.resolve(&node.tag_name, node.parent_tag.as_deref())
                .map(|info| info.name.clone())
                .unwrap_or_else(|| OPAQUE_COMPONENT.to_string())
        } else {
            OPAQUE_COMPONENT.to_string()
        };

        let mut attrs = node.attrs.clone();
        if let Some(id) = shared_id {
            attrs.set(GLOBAL_MODULE_ATTR, id);
        }
        if node.is_convertible {
            if let Some(text) = node.text() {
                attrs.set("content", text);
            }
        }
        let tree = self.convert_attributes(&component, &attrs)?;

        match &node.content {
            Content::Children(children) => {
                let body = self.serialize_nodes(tags, children, shared_id)?;
                Ok(container(&component, &tree, &body))
            }
            Content::Raw(raw) => Ok(container(&component, &tree, raw)),
            Content::Text(_) => Ok(self_closing(&component, &tree)),
        }
    }
}
