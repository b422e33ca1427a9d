//! Fixed-table resolver

use std::collections::BTreeMap;

use async_trait::async_trait;
use testbed_codec::{PropertyEntries, PropertyMap};

use crate::error::ResolverResult;
use crate::resolver::{DEFAULT_ORDER, ResolveContext, Resolver};

/// Answers from a fixed `name → value` table. Never creates resources.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    id: String,
    order: i32,
    values: BTreeMap<String, String>,
}

impl StaticResolver {
    /// Create an empty resolver with the default order.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order: DEFAULT_ORDER,
            values: BTreeMap::new(),
        }
    }

    /// Create a resolver answering from `values`.
    pub fn from_map(id: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            values,
            ..Self::new(id)
        }
    }

    /// Add one property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Override the chain order.
    #[must_use]
    pub const fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn resolvable_property_names(&self, _: &PropertyEntries, _: &PropertyMap) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn should_answer(&self, name: &str, _: &PropertyMap) -> bool {
        self.values.contains_key(name)
    }

    async fn resolve(
        &self,
        name: &str,
        _: &PropertyMap,
        _: &PropertyMap,
        _: &ResolveContext<'_>,
    ) -> ResolverResult<Option<String>> {
        Ok(self.values.get(name).cloned())
    }
}
