//! Property-based tests for conversion invariants
//!
//! These tests pin down the structural guarantees the converter makes for
//! arbitrary input rather than specific documents:
//! - Suffix decomposition is lossless for every attribute name
//! - Disabled responsive variants never leak into the output tree
//! - Dynamic-content rewriting touches nothing but decodable envelopes
//! - Documents without a legacy region pass through byte-identical
//! - Document conversion is total over arbitrary text

use blockshift::convert::dynamic;
use blockshift::convert::expansions::{Expanded, Expansion};
use blockshift::convert::paths::Suffix;
use blockshift::testing::sample_converter;
use blockshift::FlatAttrs;
use proptest::prelude::*;
use serde_json::json;

/// Literals of the four strippable variant suffixes
const SUFFIX_LITERALS: [&str; 4] = ["__sticky", "__hover", "_tablet", "_phone"];

/// Generate attribute base names that do not themselves end in a variant
/// suffix, so attaching one is unambiguous
fn base_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
        .prop_filter("base must not end in a variant suffix", |name| {
            !SUFFIX_LITERALS.iter().any(|s| name.ends_with(s))
        })
}

/// Generate arbitrary attribute names, suffix-like endings included
fn any_name_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,19}"
}

fn suffix_strategy() -> impl Strategy<Value = Suffix> {
    prop_oneof![
        Just(Suffix::None),
        Just(Suffix::Tablet),
        Just(Suffix::Phone),
        Just(Suffix::Hover),
        Just(Suffix::Sticky),
    ]
}

/// Generate enable-flag values that do not switch the variant on
fn disabled_flag_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("off".to_string()),
        Just("off|tablet".to_string()),
        Just("false".to_string()),
    ]
}

fn attribute_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9#%. -]{0,16}"
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_attach_inverts_strip_for_any_name(name in any_name_strategy()) {
            let (base, suffix) = Suffix::strip(&name);
            prop_assert_eq!(suffix.attach(base), name);
        }

        #[test]
        fn test_strip_recovers_attached_suffix(
            base in base_name_strategy(),
            suffix in suffix_strategy(),
        ) {
            let name = suffix.attach(&base);
            let (stripped_base, stripped_suffix) = Suffix::strip(&name);
            prop_assert_eq!(stripped_base, base);
            prop_assert_eq!(stripped_suffix, suffix);
        }

        #[test]
        fn test_disabled_variants_leave_no_trace(
            base in base_name_strategy(),
            value in attribute_value_strategy(),
            flag in disabled_flag_strategy(),
        ) {
            let mut attrs = FlatAttrs::new();
            attrs.set(&format!("{base}_tablet"), &value);
            attrs.set(&format!("{base}_last_edited"), &flag);

            let mut cx = sample_converter();
            let tree = cx.convert_attributes("builder/text", &attrs).unwrap();
            prop_assert!(tree.is_empty(), "leaked: {tree:?}");
        }

        #[test]
        fn test_dynamic_envelope_round_trip(name in "[a-z_]{1,12}") {
            let token = dynamic::encode_token(&json!({
                "dynamic": true,
                "content": name,
                "settings": {}
            }));
            let expected = format!(r#"$dynamic({{"name":"{name}","settings":{{}}}})$"#);
            prop_assert_eq!(dynamic::substitute_tokens(&token), expected);
        }

        #[test]
        fn test_text_without_envelopes_unchanged(text in "[ -~]{0,40}") {
            prop_assume!(!text.contains("@dc@"));
            prop_assert_eq!(dynamic::substitute_tokens(&text), text);
        }

        #[test]
        fn test_documents_without_regions_pass_through(text in "[ -~]{0,60}") {
            prop_assume!(!text.contains("builder/legacy"));
            let mut cx = sample_converter();
            prop_assert_eq!(cx.convert_embedded_regions(&text).unwrap(), text);
        }

        #[test]
        fn test_spacing_always_emits_six_fields(
            segments in prop::collection::vec("[a-z0-9]{0,6}", 0..8),
        ) {
            let shorthand = segments.join("|");
            let pairs = match Expansion::Spacing.apply(&shorthand) {
                Expanded::FanOut(pairs) => pairs,
                other => panic!("expected fan-out, got {other:?}"),
            };
            let keys: Vec<&str> = pairs.iter().map(|(key, _)| *key).collect();
            prop_assert_eq!(
                keys,
                vec!["top", "right", "bottom", "left", "syncVertical", "syncHorizontal"]
            );
            for (key, value) in &pairs[4..] {
                prop_assert!(
                    *value == json!("on") || *value == json!("off"),
                    "{key} must be an on/off flag, got {value:?}"
                );
            }
        }

        #[test]
        fn test_document_conversion_is_total(text in "[ -~]{0,80}") {
            let mut cx = sample_converter();
            prop_assert!(cx.convert_document(&text).is_ok());
        }
    }
}

#[cfg(test)]
mod specific_tests {
    use super::*;

    #[test]
    fn test_bare_suffix_literal_is_its_own_base() {
        assert_eq!(Suffix::strip("_tablet"), ("_tablet", Suffix::None));
        assert_eq!(Suffix::strip("__hover"), ("__hover", Suffix::None));
    }

    #[test]
    fn test_only_outermost_suffix_strips() {
        assert_eq!(
            Suffix::strip("padding_phone__hover"),
            ("padding_phone", Suffix::Hover)
        );
    }

    #[test]
    fn test_empty_document_converts_to_empty() {
        let mut cx = sample_converter();
        assert_eq!(cx.convert_document("").unwrap(), "");
    }

    #[test]
    fn test_unterminated_region_marker_left_alone() {
        let mut cx = sample_converter();
        let doc = "<!-- builder/legacy -->\n[pb_text]stranded[/pb_text]";
        assert_eq!(cx.convert_embedded_regions(doc).unwrap(), doc);
    }
}
