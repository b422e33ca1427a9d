//! Ordered resolver chain.
//!
//! Resolvers are stored sorted by order (lower first); ties keep their
//! registration order. Registration is protected by an `RwLock` so it can
//! happen concurrently with reads. Every walk snapshots the list and
//! releases the lock before awaiting.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use testbed_codec::{Envelope, PropertyEntries, PropertyMap};
use testbed_resource::{ResourceCache, ScopeId};

use crate::resolver::{ResolveContext, Resolver};

/// The ordered set of resolvers hosted by a server.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: RwLock<Vec<Arc<dyn Resolver>>>,
}

impl ResolverChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(self, resolver: impl Resolver + 'static) -> Self {
        self.register(Arc::new(resolver));
        self
    }

    /// Register a resolver. `sort_by_key` is stable, so equal orders keep
    /// registration sequence.
    pub fn register(&self, resolver: Arc<dyn Resolver>) {
        tracing::debug!(id = resolver.id(), order = resolver.order(), "Registering resolver");
        let mut resolvers = self.resolvers.write();
        resolvers.push(resolver);
        resolvers.sort_by_key(|r| r.order());
    }

    fn snapshot(&self) -> Vec<Arc<dyn Resolver>> {
        self.resolvers.read().clone()
    }

    /// Union of every resolver's resolvable names, in chain order, with
    /// duplicates removed by first occurrence.
    pub fn list_resolvable_names(
        &self,
        entries: &PropertyEntries,
        config: &PropertyMap,
    ) -> Vec<String> {
        let names = dedup(
            self.snapshot()
                .iter()
                .flat_map(|r| r.resolvable_property_names(entries, config)),
        );
        tracing::trace!(count = names.len(), "Listed resolvable names");
        names
    }

    /// Walk the chain for `name`.
    ///
    /// The first resolver returning a value wins. A resolver error stops the
    /// walk and becomes an error envelope. Nobody answering yields `Empty`.
    pub async fn resolve(
        &self,
        name: &str,
        properties: &PropertyMap,
        config: &PropertyMap,
        cache: &ResourceCache,
    ) -> Envelope<String> {
        let ctx = ResolveContext::new(cache, ScopeId::from_properties(properties));

        for resolver in self.snapshot() {
            if !resolver.should_answer(name, properties) {
                tracing::trace!(resolver = resolver.id(), name, "Resolver declined");
                continue;
            }
            match resolver.resolve(name, properties, config, &ctx).await {
                Ok(Some(value)) => {
                    tracing::debug!(resolver = resolver.id(), name, scope = %ctx.scope(), "Property resolved");
                    return Envelope::Value(value);
                }
                Ok(None) => {
                    tracing::trace!(resolver = resolver.id(), name, "Resolver had no value");
                }
                Err(error) => {
                    tracing::warn!(resolver = resolver.id(), name, %error, "Resolver failed");
                    return Envelope::Error(error.to_string());
                }
            }
        }

        tracing::debug!(name, "No resolver could answer");
        Envelope::Empty
    }

    /// The first non-empty requirement list declared for `expression`.
    pub fn required_properties(&self, expression: &str) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|r| r.required_properties(expression))
            .find(|required| !required.is_empty())
            .unwrap_or_default()
    }

    /// Union of the property entries every resolver needs, deduplicated.
    pub fn required_property_entries(&self) -> Vec<String> {
        dedup(
            self.snapshot()
                .iter()
                .flat_map(|r| r.required_property_entries()),
        )
    }

    /// Number of registered resolvers.
    pub fn len(&self) -> usize {
        self.resolvers.read().len()
    }

    /// `true` when no resolver is registered.
    pub fn is_empty(&self) -> bool {
        self.resolvers.read().is_empty()
    }

    /// Resolver ids in chain order.
    pub fn ids(&self) -> Vec<String> {
        self.resolvers
            .read()
            .iter()
            .map(|r| r.id().to_string())
            .collect()
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.ids())
            .finish()
    }
}

fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
