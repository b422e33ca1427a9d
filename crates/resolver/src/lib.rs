//! # testbed-resolver
//!
//! Resolvers turn a property name into a concrete value, possibly by
//! starting a container. The [`ResolverChain`] orders them and walks them
//! first-match-wins.
//!
//! ```
//! use testbed_codec::{Envelope, PropertyMap};
//! use testbed_resolver::{ResolverChain, StaticResolver};
//! use testbed_resource::ResourceCache;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let chain = ResolverChain::new()
//!     .with(StaticResolver::new("static").with_property("greeting", "hello"));
//! let cache = ResourceCache::new();
//!
//! let answer = chain
//!     .resolve("greeting", &PropertyMap::new(), &PropertyMap::new(), &cache)
//!     .await;
//! assert_eq!(answer, Envelope::Value("hello".to_string()));
//! # }
//! ```

pub mod chain;
pub mod container;
pub mod error;
pub mod resolver;
pub mod static_resolver;

pub use chain::ResolverChain;
pub use container::{
    ContainerHandle, ContainerMetadata, ContainerProvider, ContainerResolver, ContainerRuntime,
    ImageName, RuntimeContainer,
};
pub use error::{ResolverError, ResolverResult};
pub use resolver::{DEFAULT_ORDER, FALLBACK_ORDER, ResolveContext, Resolver, SPECIFIC_ORDER};
pub use static_resolver::StaticResolver;
