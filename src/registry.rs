//! Component registry contract
//!
//! The engine does not own any component definitions. A host supplies them
//! through the `ComponentRegistry` trait: which component types exist, which
//! legacy tag each one answers to, how its flat attributes map onto nested
//! paths, and the attribute schema used to classify preset leaves. Everything
//! the engine reads from the registry is treated as immutable configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::formats::shortcode::FlatAttrs;

/// Callback resolving a path template from sibling attribute values.
///
/// Used when one legacy field's destination depends on another field, for
/// example an image that is placed differently when a fullwidth toggle is on.
pub type ConditionalPath = Arc<dyn Fn(&FlatAttrs) -> String + Send + Sync>;

/// One component type as declared by the registry
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInfo {
    /// Component type name in the new format (e.g. "builder/text")
    pub name: String,
    /// Legacy tag this component answers to (e.g. "pb_text")
    pub legacy_alias: String,
    /// Component type names of structural children, empty for leaf modules
    pub children: Vec<String>,
}

impl ComponentInfo {
    pub fn new(name: &str, legacy_alias: &str, children: &[&str]) -> Self {
        ComponentInfo {
            name: name.to_string(),
            legacy_alias: legacy_alias.to_string(),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Component-declared pieces of a conversion map.
///
/// The engine composes this with its own fixed advanced-option tables to
/// produce the final `ConversionMap` for a component type. Expansion
/// references are plain ids here and are resolved eagerly during
/// composition, so a typo in a registration fails the first conversion
/// that touches the component instead of corrupting output.
#[derive(Default, Clone)]
pub struct ConversionOutline {
    /// Overrides for the engine-declared advanced option paths
    pub advanced_option_overrides: BTreeMap<String, String>,
    /// Attribute name to path template for component-specific fields
    pub structural_attribute_map: BTreeMap<String, String>,
    /// Attribute name to value-expansion transform id
    pub value_expansion_overrides: BTreeMap<String, String>,
    /// Attribute name to sibling-dependent path callback
    pub conditional_map: BTreeMap<String, ConditionalPath>,
}

/// Capability tag attached to schema leaves, used to partition presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The field affects rendering style
    Style,
    /// The field affects content or behavior
    Content,
}

/// One node of a component's declared attribute schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Nested group of named sub-fields
    Group(BTreeMap<String, SchemaNode>),
    /// Terminal field carrying capability tags
    Leaf(Vec<Capability>),
}

impl SchemaNode {
    /// Convenience constructor for a group node
    pub fn group(entries: Vec<(&str, SchemaNode)>) -> Self {
        SchemaNode::Group(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    /// Convenience constructor for a leaf node
    pub fn leaf(capabilities: &[Capability]) -> Self {
        SchemaNode::Leaf(capabilities.to_vec())
    }
}

/// Declared attribute schema for one component type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleSchema {
    pub root: BTreeMap<String, SchemaNode>,
}

impl ModuleSchema {
    pub fn new(entries: Vec<(&str, SchemaNode)>) -> Self {
        ModuleSchema {
            root: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// Read-only view of the host's component definitions
pub trait ComponentRegistry {
    /// All component types, with their legacy aliases and child lists
    fn list_components(&self) -> Vec<ComponentInfo>;

    /// Conversion outline for a component type, `None` when unregistered
    fn conversion_outline(&self, component: &str) -> Option<ConversionOutline>;

    /// Attribute schema for a component type, `None` when undeclared
    fn schema(&self, component: &str) -> Option<ModuleSchema>;
}
