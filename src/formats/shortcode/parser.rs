//! Recursive legacy markup parser
//!
//! # Tag matching
//!
//! The parser does not scan for arbitrary `[...]` regions. It builds one
//! alternation pattern from the union of registry-declared legacy aliases and
//! externally supplied extra tag lists, longest alias first so a tag never
//! matches a prefix of a longer sibling. A match is accepted only when the
//! text after the tag name is a plausible attribute string (empty, or
//! starting with whitespace, or a lone self-closing slash); otherwise the
//! scan resumes one byte past the opening bracket.
//!
//! # Convertibility
//!
//! A matched tag is convertible when it resolves to a registered component
//! and does not carry the opt-out marker. Non-convertible nodes keep only an
//! allow-listed attribute subset, gain marker attributes recording the
//! original tag, and store their entire matched text verbatim so nothing is
//! lost in round-trip.
//!
//! # Nesting
//!
//! Layout containers always recurse. Any other component recurses only when
//! it declares child tags and its content visibly starts with one of their
//! aliases; everything else is inline text. Closing tags are located by first
//! occurrence, matching the host tokenizer this format comes from, and a
//! missing closer degrades the node to self-closing.

use std::collections::HashMap;

use regex::Regex;

use super::attrs::parse_attrs;
use super::{
    Content, ShortcodeNode, DO_NOT_CONVERT, DO_NOT_CONVERT_ATTR, OPAQUE_KEEP_ATTRS,
    SHORTCODE_NAME_ATTR,
};
use crate::registry::ComponentInfo;

/// Legacy tags that always nest regardless of content shape
const STRUCTURAL_TAGS: &[&str] = &[
    "pb_section",
    "pb_fullwidth_section",
    "pb_specialty_section",
    "pb_row",
    "pb_row_inner",
    "pb_column",
    "pb_column_inner",
];

/// Compiled view of every tag the parser recognizes
pub(crate) struct TagSet {
    by_alias: HashMap<String, Vec<ComponentInfo>>,
    by_name: HashMap<String, ComponentInfo>,
    pattern: Regex,
}

impl TagSet {
    pub(crate) fn new(components: Vec<ComponentInfo>, extra_tags: &[String]) -> Self {
        let mut by_alias: HashMap<String, Vec<ComponentInfo>> = HashMap::new();
        let mut by_name = HashMap::new();
        for info in components {
            by_alias
                .entry(info.legacy_alias.clone())
                .or_default()
                .push(info.clone());
            by_name.insert(info.name.clone(), info);
        }

        let mut tags: Vec<String> = by_alias
            .keys()
            .cloned()
            .chain(extra_tags.iter().cloned())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();
        // Longest first: the alternation is preference-ordered
        tags.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let union = tags
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\[({union})([^\]]*)\]")).unwrap();

        TagSet {
            by_alias,
            by_name,
            pattern,
        }
    }

    pub(crate) fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub(crate) fn is_structural(&self, tag: &str) -> bool {
        STRUCTURAL_TAGS.contains(&tag)
    }

    /// Resolve a legacy tag to its component, using the enclosing tag to pick
    /// between same-named child components that differ by structural context
    pub(crate) fn resolve(&self, tag: &str, parent_tag: Option<&str>) -> Option<&ComponentInfo> {
        let candidates = self.by_alias.get(tag)?;
        if candidates.len() > 1 {
            if let Some(parents) = parent_tag.and_then(|p| self.by_alias.get(p)) {
                for parent in parents {
                    for candidate in candidates {
                        if parent.children.iter().any(|c| c == &candidate.name) {
                            return Some(candidate);
                        }
                    }
                }
            }
        }
        candidates.first()
    }

    /// Legacy aliases of a component's declared children
    fn child_aliases(&self, info: &ComponentInfo) -> Vec<&str> {
        info.children
            .iter()
            .filter_map(|name| self.by_name.get(name))
            .map(|child| child.legacy_alias.as_str())
            .collect()
    }
}

/// Parses a legacy document string into a forest of nodes
pub struct ShortcodeParser<'t> {
    tags: &'t TagSet,
}

impl<'t> ShortcodeParser<'t> {
    pub(crate) fn new(tags: &'t TagSet) -> Self {
        ShortcodeParser { tags }
    }

    /// Parse a whole document. Text outside recognized tags is not preserved.
    pub fn parse(&self, source: &str) -> Vec<ShortcodeNode> {
        self.parse_region(source, None)
    }

    fn parse_region(&self, source: &str, parent_tag: Option<&str>) -> Vec<ShortcodeNode> {
        let mut nodes = Vec::new();
        let mut pos = 0;

        while pos < source.len() {
            let caps = match self.tags.pattern().captures_at(source, pos) {
                Some(caps) => caps,
                None => break,
            };
            let whole = caps.get(0).unwrap();
            let tag = caps.get(1).map_or("", |m| m.as_str());
            let rest = caps.get(2).map_or("", |m| m.as_str());

            // A longer unregistered tag can start with a registered alias
            if !valid_tag_boundary(rest) {
                pos = whole.start() + 1;
                continue;
            }

            let trimmed = rest.trim();
            let self_closing = trimmed.ends_with('/');
            let attr_text = if self_closing {
                trimmed[..trimmed.len() - 1].trim_end()
            } else {
                rest
            };
            let mut attrs = parse_attrs(attr_text);

            let open_end = whole.end();
            let (inner, span_end) = if self_closing {
                (None, open_end)
            } else {
                let close = format!("[/{tag}]");
                match source[open_end..].find(&close) {
                    Some(rel) => (
                        Some(&source[open_end..open_end + rel]),
                        open_end + rel + close.len(),
                    ),
                    // Unclosed tags behave as self-closing
                    None => (None, open_end),
                }
            };

            let component = self.tags.resolve(tag, parent_tag);
            let opted_out = attrs.get(DO_NOT_CONVERT_ATTR) == Some(DO_NOT_CONVERT);
            let is_convertible = component.is_some() && !opted_out;

            let content = if is_convertible {
                let inner = inner.unwrap_or("");
                let nest = self.tags.is_structural(tag)
                    || component.is_some_and(|info| {
                        !info.children.is_empty()
                            && starts_with_child_tag(inner, &self.tags.child_aliases(info))
                    });
                if nest {
                    Content::Children(self.parse_region(inner, Some(tag)))
                } else {
                    Content::Text(inner.to_string())
                }
            } else {
                attrs.retain(|name| OPAQUE_KEEP_ATTRS.contains(&name));
                attrs.set(DO_NOT_CONVERT_ATTR, DO_NOT_CONVERT);
                attrs.set(SHORTCODE_NAME_ATTR, tag);
                Content::Raw(source[whole.start()..span_end].to_string())
            };

            nodes.push(ShortcodeNode {
                tag_name: tag.to_string(),
                attrs,
                content,
                parent_tag: parent_tag.map(|p| p.to_string()),
                is_convertible,
            });

            pos = span_end;
        }

        nodes
    }
}

fn valid_tag_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace()) || rest.trim() == "/"
}

fn starts_with_child_tag(content: &str, aliases: &[&str]) -> bool {
    let trimmed = content.trim_start();
    for alias in aliases {
        if let Some(after) = trimmed.strip_prefix('[').and_then(|t| t.strip_prefix(*alias)) {
            let boundary = after
                .chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '-'));
            if boundary {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::shortcode::GLOBAL_MODULE_ATTR;

    fn sample_tags() -> TagSet {
        let components = vec![
            ComponentInfo::new("builder/section", "pb_section", &["builder/row"]),
            ComponentInfo::new("builder/row", "pb_row", &["builder/column"]),
            ComponentInfo::new(
                "builder/column",
                "pb_column",
                &["builder/text", "builder/accordion", "builder/carousel"],
            ),
            ComponentInfo::new("builder/text", "pb_text", &[]),
            ComponentInfo::new("builder/accordion", "pb_accordion", &["builder/accordion-item"]),
            ComponentInfo::new("builder/accordion-item", "pb_item", &[]),
            ComponentInfo::new("builder/carousel", "pb_carousel", &["builder/carousel-item"]),
            ComponentInfo::new("builder/carousel-item", "pb_item", &[]),
        ];
        TagSet::new(components, &["foo_widget".to_string()])
    }

    fn parse(source: &str) -> Vec<ShortcodeNode> {
        let tags = sample_tags();
        ShortcodeParser::new(&tags).parse(source)
    }

    #[test]
    fn test_parse_simple_text_module() {
        let nodes = parse(r#"[pb_text admin_label="Intro"]Hello world[/pb_text]"#);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag_name, "pb_text");
        assert!(nodes[0].is_convertible);
        assert_eq!(nodes[0].attrs.get("admin_label"), Some("Intro"));
        assert_eq!(nodes[0].content, Content::Text("Hello world".to_string()));
    }

    #[test]
    fn test_parse_structural_nesting() {
        let nodes = parse(
            "[pb_section][pb_row][pb_column][pb_text]Hi[/pb_text][/pb_column][/pb_row][/pb_section]",
        );
        assert_eq!(nodes.len(), 1);
        let section = &nodes[0];
        assert_eq!(section.children().len(), 1);
        let row = &section.children()[0];
        assert_eq!(row.parent_tag.as_deref(), Some("pb_section"));
        let column = &row.children()[0];
        let text = &column.children()[0];
        assert_eq!(text.tag_name, "pb_text");
        assert_eq!(text.text(), Some("Hi"));
    }

    #[test]
    fn test_parse_empty_structural_container() {
        let nodes = parse("[pb_section][/pb_section]");
        assert_eq!(nodes[0].content, Content::Children(vec![]));
    }

    #[test]
    fn test_parse_self_closing() {
        let nodes = parse("[pb_text /]");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].content, Content::Text(String::new()));
    }

    #[test]
    fn test_parse_unclosed_degrades_to_self_closing() {
        let nodes = parse(r##"[pb_text color="#000"]"##);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].attrs.get("color"), Some("#000"));
        assert_eq!(nodes[0].content, Content::Text(String::new()));
    }

    #[test]
    fn test_parse_unknown_tag_becomes_opaque() {
        let source = r#"[foo_widget x="1" admin_label="Legacy"]bar[/foo_widget]"#;
        let nodes = parse(source);
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert!(!node.is_convertible);
        assert_eq!(node.attrs.get(SHORTCODE_NAME_ATTR), Some("foo_widget"));
        assert_eq!(node.attrs.get(DO_NOT_CONVERT_ATTR), Some("yes"));
        assert_eq!(node.attrs.get("admin_label"), Some("Legacy"));
        assert_eq!(node.attrs.get("x"), None);
        assert_eq!(node.content, Content::Raw(source.to_string()));
    }

    #[test]
    fn test_parse_opt_out_marker() {
        let source = r#"[pb_text do_not_convert="yes" global_module="42"]Keep[/pb_text]"#;
        let nodes = parse(source);
        let node = &nodes[0];
        assert!(!node.is_convertible);
        assert_eq!(node.attrs.get(GLOBAL_MODULE_ATTR), Some("42"));
        assert_eq!(node.content, Content::Raw(source.to_string()));
    }

    #[test]
    fn test_parse_skips_prefix_collisions() {
        // pb_texture is not a known tag even though pb_text is its prefix
        let nodes = parse("[pb_texture][pb_text]ok[/pb_text]");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag_name, "pb_text");
        assert_eq!(nodes[0].text(), Some("ok"));
    }

    #[test]
    fn test_parse_interstitial_text_dropped() {
        let nodes = parse("junk before [pb_text]a[/pb_text] junk after");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text(), Some("a"));
    }

    #[test]
    fn test_parse_parent_disambiguates_shared_alias() {
        let nodes = parse("[pb_column][pb_accordion][pb_item]A[/pb_item][/pb_accordion][/pb_column]");
        let accordion = &nodes[0].children()[0];
        let item = &accordion.children()[0];
        assert_eq!(item.tag_name, "pb_item");
        assert_eq!(item.parent_tag.as_deref(), Some("pb_accordion"));

        let tags = sample_tags();
        let resolved = tags.resolve("pb_item", Some("pb_accordion")).unwrap();
        assert_eq!(resolved.name, "builder/accordion-item");
        let resolved = tags.resolve("pb_item", Some("pb_carousel")).unwrap();
        assert_eq!(resolved.name, "builder/carousel-item");
    }

    #[test]
    fn test_parse_child_alias_triggers_nesting() {
        // Accordion is not in the structural set; it nests because its
        // content starts with a declared child's alias.
        let nodes = parse("[pb_accordion][pb_item]A[/pb_item][pb_item]B[/pb_item][/pb_accordion]");
        assert_eq!(nodes[0].children().len(), 2);
    }

    #[test]
    fn test_parse_plain_text_content_does_not_nest() {
        let nodes = parse("[pb_accordion]loose text[/pb_accordion]");
        assert_eq!(nodes[0].content, Content::Text("loose text".to_string()));
    }

    #[test]
    fn test_close_tag_first_occurrence_wins() {
        let nodes = parse("[pb_text]a[/pb_text][pb_text]b[/pb_text]");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text(), Some("a"));
        assert_eq!(nodes[1].text(), Some("b"));
    }
}
