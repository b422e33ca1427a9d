//! Cache keys

use std::fmt;

use testbed_codec::{PropertyMap, SCOPE_PROPERTY, Value};

/// Composite identity of a cached resource:
/// `(resolver id, logical resource name, input properties)`.
///
/// The input properties are kept in full so that equal keys always mean
/// equal inputs. The scope property is stripped: which scope asked for a
/// resource does not change what the resource is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    resolver: String,
    name: String,
    properties: PropertyMap,
}

impl ResourceKey {
    /// Build a key from its parts.
    pub fn new(
        resolver: impl Into<String>,
        name: impl Into<String>,
        properties: &PropertyMap,
    ) -> Self {
        let mut properties = properties.clone();
        properties.remove(SCOPE_PROPERTY);
        Self {
            resolver: resolver.into(),
            name: name.into(),
            properties,
        }
    }

    /// Identity of the resolver that owns this kind of resource.
    pub fn resolver(&self) -> &str {
        &self.resolver
    }

    /// Logical resource name, e.g. `postgres`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input properties the resource was created from.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resolver, self.name)?;
        if !self.properties.is_empty() {
            write!(f, "{}", Value::Map(self.properties.clone()))?;
        }
        Ok(())
    }
}
