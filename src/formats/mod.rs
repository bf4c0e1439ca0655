//! Markup formats handled by the engine
//!
//! `shortcode` covers the flat legacy input syntax, `block` the nested
//! comment-delimited output syntax.

pub mod block;
pub mod shortcode;
