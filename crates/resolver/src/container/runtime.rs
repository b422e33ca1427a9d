//! Container runtime boundary
//!
//! The driver that pulls and runs images lives outside this workspace.
//! [`RuntimeContainer`] adapts whatever it returns into a cacheable
//! resource that stops the container on shutdown.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use testbed_codec::PropertyMap;
use testbed_resource::Resource;

use super::image::ImageName;
use crate::error::ResolverResult;

/// A started container as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    /// Runtime-assigned container id
    pub id: String,
    /// The image it was started from
    pub image: ImageName,
    /// Host the mapped ports are reachable on
    pub host: String,
    /// Container port → host port
    pub ports: BTreeMap<u16, u16>,
}

impl ContainerHandle {
    /// Host port mapped to `container_port`.
    pub fn mapped_port(&self, container_port: u16) -> Option<u16> {
        self.ports.get(&container_port).copied()
    }
}

/// Driver able to start and stop containers.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Start a container from `image`.
    async fn start(
        &self,
        image: &ImageName,
        properties: &PropertyMap,
    ) -> ResolverResult<ContainerHandle>;

    /// Stop and remove a container.
    async fn stop(&self, handle: &ContainerHandle) -> ResolverResult<()>;
}

/// A running container owned by the resource cache.
pub struct RuntimeContainer {
    handle: ContainerHandle,
    runtime: Arc<dyn ContainerRuntime>,
}

impl RuntimeContainer {
    /// Start `image` on `runtime`.
    pub async fn start(
        runtime: Arc<dyn ContainerRuntime>,
        image: &ImageName,
        properties: &PropertyMap,
    ) -> ResolverResult<Self> {
        let handle = runtime.start(image, properties).await?;
        tracing::info!(id = %handle.id, image = %handle.image, "Container started");
        Ok(Self { handle, runtime })
    }

    /// The runtime's view of the container.
    pub const fn handle(&self) -> &ContainerHandle {
        &self.handle
    }
}

#[async_trait]
impl Resource for RuntimeContainer {
    fn describe(&self) -> String {
        format!("container {} ({})", self.handle.id, self.handle.image)
    }

    async fn shutdown(&self) -> testbed_resource::Result<()> {
        self.runtime
            .stop(&self.handle)
            .await
            .map_err(|e| testbed_resource::Error::shutdown(self.describe(), e.to_string()))
    }
}

impl std::fmt::Debug for RuntimeContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContainer")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
