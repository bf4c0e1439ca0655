//! Preset bundle conversion
//!
//! Presets are stored outside any document, keyed by legacy component type
//! and preset id, each record carrying `{name, settings, version}`. Their
//! settings run through the same attribute engine as document nodes, then the
//! converted tree is partitioned into style-affecting and content-affecting
//! projections alongside the full tree. The partition is driven by a
//! `PresetAttributeMap` derived once per component type from the registry's
//! attribute schema: every converted leaf path is classified by the
//! capability tags of its longest matching schema prefix, after the
//! viewport and state axis segments are stripped out.
//!
//! An already converted store is recognized by its top-level `modules` key
//! and returned unchanged. Malformed preset records are skipped, never
//! fatal; an undeclared schema for a registered component type is a
//! configuration error and aborts the store.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::convert::builder::set_path;
use crate::convert::Converter;
use crate::error::ConvertResult;
use crate::formats::shortcode::FlatAttrs;
use crate::registry::{Capability, ModuleSchema, SchemaNode};

/// Top-level key marking a preset store as already converted
pub(crate) const CONVERTED_STORE_KEY: &str = "modules";

/// Generic layout component the folded section flavors convert to
const SECTION_COMPONENT: &str = "builder/section";

/// Legacy section flavors that fold into the generic section type
const FOLDED_SECTION_TAGS: &[&str] = &["pb_fullwidth_section", "pb_specialty_section"];

/// Sub-fields a free-form CSS schema leaf splits into
const CSS_SUB_FIELDS: &[&str] = &["after", "before", "freeForm", "mainElement"];

/// Viewport and state segments, ignored when matching leaf paths
const AXIS_TOKENS: &[&str] = &["desktop", "tablet", "phone", "value", "hover", "sticky"];

/// Leaf-path classifier for one component type, derived from its schema
pub struct PresetAttributeMap {
    entries: BTreeMap<String, Vec<Capability>>,
}

impl PresetAttributeMap {
    pub(crate) fn derive(schema: &ModuleSchema) -> Self {
        let mut entries = BTreeMap::new();
        for (name, node) in &schema.root {
            collect_schema_entries(name.clone(), node, &mut entries);
        }
        PresetAttributeMap { entries }
    }

    /// Capabilities of the longest schema prefix covering a converted leaf
    /// path. Unmatched paths classify as neither style nor content and only
    /// appear in the full tree.
    pub(crate) fn classify(&self, leaf_path: &str) -> Vec<Capability> {
        let mut prefix = leaf_path
            .split('.')
            .filter(|segment| !AXIS_TOKENS.contains(segment))
            .collect::<Vec<_>>()
            .join(".");
        loop {
            if let Some(caps) = self.entries.get(&prefix) {
                return caps.clone();
            }
            match prefix.rfind('.') {
                Some(split) => prefix.truncate(split),
                None => return Vec::new(),
            }
        }
    }
}

fn collect_schema_entries(
    path: String,
    node: &SchemaNode,
    entries: &mut BTreeMap<String, Vec<Capability>>,
) {
    match node {
        SchemaNode::Group(children) => {
            for (name, child) in children {
                collect_schema_entries(format!("{path}.{name}"), child, entries);
            }
        }
        SchemaNode::Leaf(caps) => {
            // A free-form CSS declaration covers four concrete sub-fields
            if path == "css" || path.ends_with(".css") {
                for sub in CSS_SUB_FIELDS {
                    entries.insert(format!("{path}.{sub}"), caps.clone());
                }
            } else {
                entries.insert(path, caps.clone());
            }
        }
    }
}

/// Convert a raw preset store into the new per-component layout
pub(crate) fn convert_presets(cx: &mut Converter, store: &Value) -> ConvertResult<Value> {
    let root = match store.as_object() {
        Some(root) => root,
        None => return Ok(json!({ CONVERTED_STORE_KEY: {} })),
    };
    if root.contains_key(CONVERTED_STORE_KEY) {
        return Ok(store.clone());
    }

    let mut modules: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    for (legacy_key, records) in root {
        let records = match records.as_object() {
            Some(records) => records,
            None => continue,
        };
        let component = match preset_component(cx, legacy_key) {
            Some(component) => component,
            None => continue,
        };
        let preset_map = cx.preset_map(&component)?;
        for (preset_id, record) in records {
            if let Some(converted) = convert_record(cx, &component, &preset_map, record)? {
                modules
                    .entry(component.clone())
                    .or_default()
                    .insert(preset_id.clone(), converted);
            }
        }
    }

    let mut packed = Map::new();
    for (component, presets) in modules {
        packed.insert(component, Value::Object(presets));
    }
    Ok(json!({ CONVERTED_STORE_KEY: packed }))
}

/// Target component type for a legacy preset key. The two wide section
/// flavors fold into the generic section layout.
fn preset_component(cx: &mut Converter, legacy_key: &str) -> Option<String> {
    if FOLDED_SECTION_TAGS.contains(&legacy_key) {
        return Some(SECTION_COMPONENT.to_string());
    }
    cx.resolve_component(legacy_key, None)
}

/// Convert one preset record, `None` when the record is malformed
fn convert_record(
    cx: &mut Converter,
    component: &str,
    preset_map: &PresetAttributeMap,
    record: &Value,
) -> ConvertResult<Option<Value>> {
    let record = match record.as_object() {
        Some(record) => record,
        None => return Ok(None),
    };
    let settings = match record.get("settings").and_then(Value::as_object) {
        Some(settings) => settings,
        None => return Ok(None),
    };

    let mut attrs = FlatAttrs::new();
    for (name, value) in settings {
        let raw = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        attrs.set(name, &raw);
    }

    let tree = cx.convert_attributes(component, &attrs)?;
    let (style_attrs, content_attrs) = partition(&tree, preset_map);

    let name = record.get("name").and_then(Value::as_str);
    let version = record.get("version").and_then(Value::as_str).unwrap_or("");
    Ok(Some(json!({
        "name": name.unwrap_or(""),
        "version": version,
        "attrs": tree,
        "styleAttrs": style_attrs,
        "contentAttrs": content_attrs,
    })))
}

/// Split a converted tree into its style and content projections
fn partition(
    tree: &Map<String, Value>,
    preset_map: &PresetAttributeMap,
) -> (Map<String, Value>, Map<String, Value>) {
    let mut leaves = Vec::new();
    collect_leaves(tree, String::new(), &mut leaves);

    let mut style = Map::new();
    let mut content = Map::new();
    for (path, value) in leaves {
        for capability in preset_map.classify(&path) {
            match capability {
                Capability::Style => set_path(&mut style, &path, value.clone()),
                Capability::Content => set_path(&mut content, &path, value.clone()),
            }
        }
    }
    (style, content)
}

fn collect_leaves(tree: &Map<String, Value>, prefix: String, out: &mut Vec<(String, Value)>) {
    for (key, value) in tree {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(children) => collect_leaves(children, path, out),
            leaf => out.push((path, leaf.clone())),
        }
    }
}
