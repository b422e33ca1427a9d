//! Shared handler state

use std::sync::Arc;

use testbed_codec::PropertyMap;
use testbed_resolver::{ResolverChain, StaticResolver};
use testbed_resource::ResourceCache;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;

/// Id of the resolver serving `static-properties`.
pub const STATIC_RESOLVER_ID: &str = "static";

/// Everything a request handler needs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ServerState {
    chain: Arc<ResolverChain>,
    cache: Arc<ResourceCache>,
    access_token: Option<Arc<str>>,
    defaults: Arc<PropertyMap>,
    tasks: TaskTracker,
}

impl ServerState {
    /// State over an existing chain and cache, with no token and no
    /// default configuration.
    pub fn new(chain: Arc<ResolverChain>, cache: Arc<ResourceCache>) -> Self {
        Self {
            chain,
            cache,
            access_token: None,
            defaults: Arc::new(PropertyMap::new()),
            tasks: TaskTracker::new(),
        }
    }

    /// State for `config`: registers its static properties on `chain` and
    /// starts with an empty cache.
    pub fn from_config(config: &ServerConfig, chain: ResolverChain) -> Self {
        if !config.static_properties.is_empty() {
            chain.register(Arc::new(StaticResolver::from_map(
                STATIC_RESOLVER_ID,
                config.static_properties.clone(),
            )));
        }
        Self::new(Arc::new(chain), Arc::new(ResourceCache::new()))
            .with_access_token(config.effective_token())
            .with_defaults(config.default_config())
    }

    /// Require `token` on every request.
    pub fn with_access_token(mut self, token: Option<&str>) -> Self {
        self.access_token = token.map(Arc::from);
        self
    }

    /// Server-wide configuration defaults.
    pub fn with_defaults(mut self, defaults: PropertyMap) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    /// The resolver chain.
    pub fn chain(&self) -> &Arc<ResolverChain> {
        &self.chain
    }

    /// The resource cache.
    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    /// Request work running on its own tasks. Shutdown waits for it before
    /// closing the cache.
    pub fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    /// The required access token, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// `request` layered over the server defaults; request keys win.
    pub fn merged_config(&self, request: PropertyMap) -> PropertyMap {
        if self.defaults.is_empty() {
            return request;
        }
        let mut merged = (*self.defaults).clone();
        merged.extend(request);
        merged
    }
}
