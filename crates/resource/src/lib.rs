//! # testbed-resource
//!
//! Cache for expensive resources (running containers and the like) used by
//! resolvers. Guarantees a single creation per [`ResourceKey`] under
//! concurrent access and ties each resource's lifetime to the [`ScopeId`]
//! that created it.

pub mod cache;
pub mod error;
pub mod key;
pub mod resource;
pub mod scope;

pub use cache::{CacheStats, ResourceCache};
pub use error::{BoxError, Error, Result};
pub use key::ResourceKey;
pub use resource::Resource;
pub use scope::ScopeId;
