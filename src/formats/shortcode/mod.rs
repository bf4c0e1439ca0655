//! Legacy shortcode format: node model and parsing
//!
//! A legacy document is a flat string of `[tag key="value"]content[/tag]`
//! regions. Parsing produces a forest of `ShortcodeNode` values; each node is
//! either convertible (a registered component) or opaque, in which case its
//! original text is carried through verbatim.

mod attrs;
mod parser;

pub use attrs::{parse_attrs, FlatAttrs};
pub use parser::ShortcodeParser;
pub(crate) use parser::TagSet;

/// Attribute value marking a node as opted out of conversion
pub const DO_NOT_CONVERT: &str = "yes";

/// Attribute carrying the opt-out marker
pub const DO_NOT_CONVERT_ATTR: &str = "do_not_convert";

/// Attribute recording the original tag name on opaque nodes
pub const SHORTCODE_NAME_ATTR: &str = "shortcode_name";

/// Attribute linking a node to a shared global instance
pub const GLOBAL_MODULE_ATTR: &str = "global_module";

/// Attributes kept on opaque nodes besides the markers added by the parser
pub const OPAQUE_KEEP_ATTRS: &[&str] = &["admin_label", GLOBAL_MODULE_ATTR];

/// Content of a parsed node
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Inline text with no nested tags
    Text(String),
    /// Entire original matched text of an opaque node, emitted verbatim
    Raw(String),
    /// Nested convertible children
    Children(Vec<ShortcodeNode>),
}

/// One parsed instance of a legacy tag
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcodeNode {
    /// Legacy tag name as matched in the source
    pub tag_name: String,
    /// Flat legacy attributes in source order
    pub attrs: FlatAttrs,
    pub content: Content,
    /// Tag name of the enclosing node, for context-dependent child tags
    pub parent_tag: Option<String>,
    /// False for unknown tags and explicit opt-outs
    pub is_convertible: bool,
}

impl ShortcodeNode {
    /// Inline text content, if this node carries any
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// Nested children, empty for leaf and opaque nodes
    pub fn children(&self) -> &[ShortcodeNode] {
        match &self.content {
            Content::Children(children) => children,
            _ => &[],
        }
    }
}
