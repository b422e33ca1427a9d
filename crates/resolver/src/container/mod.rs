//! Container-backed resolvers.
//!
//! A [`ContainerProvider`] knows one technology (Postgres, Kafka, ...): which
//! properties it answers, how to start its container and how to read values
//! off a running one. [`ContainerResolver`] turns a provider into a
//! [`Resolver`] that caches one container per distinct input.

mod image;
mod metadata;
mod runtime;

pub use image::ImageName;
pub use metadata::ContainerMetadata;
pub use runtime::{ContainerHandle, ContainerRuntime, RuntimeContainer};

use async_trait::async_trait;
use testbed_codec::{PropertyEntries, PropertyMap};
use testbed_resource::{Resource, ResourceKey};

use crate::error::ResolverResult;
use crate::resolver::{ResolveContext, Resolver, SPECIFIC_ORDER};

/// One container technology.
#[async_trait]
pub trait ContainerProvider: Send + Sync + 'static {
    /// The running container type stored in the cache.
    type Container: Resource;

    /// Short name, e.g. `postgres`. Used in cache keys and configuration.
    fn simple_name(&self) -> &str;

    /// Image used when the configuration does not override it.
    fn default_image_name(&self) -> &str;

    /// Property names this provider can produce.
    fn resolvable_property_names(
        &self,
        entries: &PropertyEntries,
        config: &PropertyMap,
    ) -> Vec<String>;

    /// Property entries this provider needs as bulk input.
    fn required_property_entries(&self) -> Vec<String> {
        Vec::new()
    }

    /// Properties needed before `expression` can be resolved.
    fn required_properties(&self, _expression: &str) -> Vec<String> {
        Vec::new()
    }

    /// Whether this provider should answer `name` at all. Lets providers for
    /// similar technologies coexist without answering for each other.
    fn should_answer(&self, _name: &str, _properties: &PropertyMap) -> bool {
        true
    }

    /// Answer without a container, e.g. from an externally managed one.
    async fn resolve_without_container(
        &self,
        _name: &str,
        _properties: &PropertyMap,
    ) -> ResolverResult<Option<String>> {
        Ok(None)
    }

    /// Start a container from `image`.
    async fn create_container(
        &self,
        image: ImageName,
        properties: &PropertyMap,
    ) -> ResolverResult<Self::Container>;

    /// Read `name` off a running container.
    fn resolve_property(&self, name: &str, container: &Self::Container) -> Option<String>;
}

/// [`Resolver`] over a [`ContainerProvider`].
#[derive(Debug)]
pub struct ContainerResolver<P> {
    id: String,
    provider: P,
}

impl<P: ContainerProvider> ContainerResolver<P> {
    /// Wrap `provider`. Its id is `containers:<simple-name>`.
    pub fn new(provider: P) -> Self {
        Self {
            id: format!("containers:{}", provider.simple_name()),
            provider,
        }
    }

    /// The wrapped provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Image to start: the configured override when present, otherwise the
    /// provider's default.
    pub fn image_for(&self, config: &PropertyMap) -> ResolverResult<ImageName> {
        let name = self.provider.simple_name();
        let configured = ContainerMetadata::for_name(name, config).and_then(|md| md.image_name);
        match configured {
            Some(image) => {
                tracing::debug!(container = name, %image, "Using configured image");
                ImageName::parse(&image)
            }
            None => ImageName::parse(self.provider.default_image_name()),
        }
    }
}

#[async_trait]
impl<P: ContainerProvider> Resolver for ContainerResolver<P> {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i32 {
        SPECIFIC_ORDER
    }

    fn resolvable_property_names(
        &self,
        entries: &PropertyEntries,
        config: &PropertyMap,
    ) -> Vec<String> {
        self.provider.resolvable_property_names(entries, config)
    }

    fn required_properties(&self, expression: &str) -> Vec<String> {
        self.provider.required_properties(expression)
    }

    fn required_property_entries(&self) -> Vec<String> {
        self.provider.required_property_entries()
    }

    fn should_answer(&self, name: &str, properties: &PropertyMap) -> bool {
        self.provider.should_answer(name, properties)
    }

    async fn resolve(
        &self,
        name: &str,
        properties: &PropertyMap,
        config: &PropertyMap,
        ctx: &ResolveContext<'_>,
    ) -> ResolverResult<Option<String>> {
        if !self.provider.should_answer(name, properties) {
            return Ok(None);
        }
        if let Some(value) = self
            .provider
            .resolve_without_container(name, properties)
            .await?
        {
            return Ok(Some(value));
        }

        let key = ResourceKey::new(&self.id, self.provider.simple_name(), properties);
        let container = ctx
            .cache()
            .get_or_create(key, ctx.scope(), || async {
                let image = self.image_for(config)?;
                tracing::info!(container = self.provider.simple_name(), %image, property = name, "Starting container");
                self.provider.create_container(image, properties).await
            })
            .await?;

        Ok(self.provider.resolve_property(name, &container))
    }
}
