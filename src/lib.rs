//! # blockshift
//!
//! Converts legacy flat shortcode markup (`[tag key="value"]...[/tag]`) into
//! the nested block format (`<!-- tag {json} -->...<!-- /tag -->`), and
//! legacy preset bundles into their per-component layout.
//!
//! The engine is a pure transformation: string to string for documents, map
//! to map for presets. It owns no component definitions and no color
//! catalog; hosts inject both through the [`registry::ComponentRegistry`]
//! and [`colors::GlobalColorStore`] traits when constructing a
//! [`Converter`]. Malformed content degrades gracefully (unknown tags pass
//! through opaque, unknown attributes are preserved under
//! `unknownAttributes`), while broken component registrations abort the
//! document with a [`ConvertError`].
//!
//! ## Testing
//!
//! Tests share the curated component catalog in the [testing](crate::testing)
//! module instead of declaring their own components inline.

pub mod colors;
pub mod convert;
pub mod error;
pub mod formats;
pub mod presets;
pub mod registry;
pub mod testing;

pub use colors::{ColorStatus, GlobalColorStore, GlobalColorToken};
pub use convert::{ConversionMap, Converter};
pub use error::{ConvertError, ConvertResult};
pub use formats::shortcode::{parse_attrs, FlatAttrs};
pub use registry::{
    Capability, ComponentInfo, ComponentRegistry, ConditionalPath, ConversionOutline,
    ModuleSchema, SchemaNode,
};
