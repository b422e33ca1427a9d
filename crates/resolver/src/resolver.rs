//! The resolver trait

use async_trait::async_trait;
use testbed_codec::{PropertyEntries, PropertyMap};
use testbed_resource::{ResourceCache, ScopeId};

use crate::error::ResolverResult;

/// Order of resolvers backed by a specific technology (containers).
pub const SPECIFIC_ORDER: i32 = -100;

/// Order used when a resolver does not pick one.
pub const DEFAULT_ORDER: i32 = 0;

/// Order of generic resolvers that should only answer when nothing else does.
pub const FALLBACK_ORDER: i32 = 100;

/// Per-call view handed to [`Resolver::resolve`].
///
/// Borrows the cache owned by the host; resolvers never own it.
#[derive(Debug, Clone)]
pub struct ResolveContext<'a> {
    cache: &'a ResourceCache,
    scope: ScopeId,
}

impl<'a> ResolveContext<'a> {
    /// Create a context for one resolve call.
    pub const fn new(cache: &'a ResourceCache, scope: ScopeId) -> Self {
        Self { cache, scope }
    }

    /// The shared resource cache.
    pub const fn cache(&self) -> &'a ResourceCache {
        self.cache
    }

    /// Scope of the current call; resources created now are owned by it.
    pub const fn scope(&self) -> &ScopeId {
        &self.scope
    }
}

/// A source of property values.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Identity used in cache keys and logs.
    fn id(&self) -> &str;

    /// Position in the chain; lower runs first.
    fn order(&self) -> i32 {
        DEFAULT_ORDER
    }

    /// Property names this resolver can produce, given the application's
    /// property entries and test resources configuration.
    fn resolvable_property_names(
        &self,
        entries: &PropertyEntries,
        config: &PropertyMap,
    ) -> Vec<String>;

    /// Properties that must be resolved before `expression` can be.
    fn required_properties(&self, _expression: &str) -> Vec<String> {
        Vec::new()
    }

    /// Property entry prefixes this resolver needs as bulk input.
    fn required_property_entries(&self) -> Vec<String> {
        Vec::new()
    }

    /// Cheap predicate run before [`Resolver::resolve`]. Returning `false`
    /// skips this resolver without touching the cache.
    fn should_answer(&self, _name: &str, _properties: &PropertyMap) -> bool {
        true
    }

    /// Resolve `name`. `Ok(None)` lets the next resolver try.
    async fn resolve(
        &self,
        name: &str,
        properties: &PropertyMap,
        config: &PropertyMap,
        ctx: &ResolveContext<'_>,
    ) -> ResolverResult<Option<String>>;
}
