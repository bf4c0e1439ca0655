//! Global color store contract
//!
//! Hosts store global colors as JSON records; the token types carry the wire
//! shape (`status` is a lowercase string) so a store implementation can
//! deserialize its payload directly.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a global color token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorStatus {
    /// Referenced as a CSS variable in converted output
    Active,
    /// Replaced by its literal resolved color
    Inactive,
    /// Treated like inactive; the token is mid-edit and not yet published
    Temporary,
}

/// One global color token as stored by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalColorToken {
    pub id: String,
    /// Resolved CSS color string (hex, rgba, named)
    pub color: String,
    pub status: ColorStatus,
}

impl GlobalColorToken {
    pub fn new(id: &str, color: &str, status: ColorStatus) -> Self {
        GlobalColorToken {
            id: id.to_string(),
            color: color.to_string(),
            status,
        }
    }
}

/// Read-only lookup into the host's global color store
pub trait GlobalColorStore {
    /// Resolve a token id to its stored record, `None` for unknown ids
    fn resolve(&self, id: &str) -> Option<GlobalColorToken>;
}
