//! Scope identifiers
//!
//! A scope groups the resources created during one logical test run.
//! Closing a scope destroys the resources it owns and nothing else.

use std::fmt;

use testbed_codec::{PropertyMap, SCOPE_PROPERTY};

use crate::error::{Error, Result};

/// Opaque scope identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(String);

impl ScopeId {
    /// Name of the scope used when a caller does not pick one.
    pub const DEFAULT: &'static str = "default";

    /// Create a scope identifier. Blank ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidScope { id });
        }
        Ok(Self(id))
    }

    /// The scope named by the `test-resources.scope` property, or the
    /// default scope when the property is absent, blank or not a string.
    pub fn from_properties(properties: &PropertyMap) -> Self {
        properties
            .get(SCOPE_PROPERTY)
            .and_then(|v| v.as_str())
            .and_then(|s| Self::new(s).ok())
            .unwrap_or_default()
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ScopeId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for ScopeId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}
