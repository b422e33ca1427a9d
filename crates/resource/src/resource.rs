//! The resource trait
//!
//! A resource is an expensive object (typically a running container) that
//! the cache creates once per key and destroys when its scope closes.

use async_trait::async_trait;

use crate::error::Result;

/// An expensive, cacheable object with a shutdown hook.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Short description used in logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Release whatever the resource holds (stop the container, close
    /// sockets). Called exactly once, when the owning scope is closed or on
    /// a global close.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
