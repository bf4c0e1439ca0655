//! Error types for the conversion engine
//!
//! Malformed content never surfaces here: unknown attributes, undecodable
//! dynamic tokens and unparsable color metadata are all recovered in place.
//! These variants cover broken component registrations only, which must abort
//! the current document instead of producing silently wrong output.

use std::fmt;

/// Errors raised while composing or applying a component's conversion map
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// A registration names a value-expansion transform id that does not exist
    UnknownTransform {
        component: String,
        attr: String,
        transform: String,
    },
    /// The registry lists a component type but cannot produce its conversion outline
    MissingOutline(String),
    /// The registry lists a component type but cannot produce its attribute schema
    MissingSchema(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::UnknownTransform {
                component,
                attr,
                transform,
            } => {
                write!(
                    f,
                    "Unknown value expansion '{transform}' declared for attribute '{attr}' on component '{component}'"
                )
            }
            ConvertError::MissingOutline(component) => {
                write!(f, "Component '{component}' has no conversion outline")
            }
            ConvertError::MissingSchema(component) => {
                write!(f, "Component '{component}' has no attribute schema")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Type alias for results produced by the conversion engine
pub type ConvertResult<T> = Result<T, ConvertError>;
