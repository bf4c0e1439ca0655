//! New nested block format: wire constants and payload writer

pub mod writer;

/// Tag delimiting a legacy region embedded inside a new-format document
pub const LEGACY_REGION_TAG: &str = "builder/legacy";

/// Generic component wrapping opaque pass-through nodes
pub const OPAQUE_COMPONENT: &str = "builder/shortcode";
