//! Bound server with graceful shutdown

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::routes::router;
use crate::state::ServerState;

/// A resolution server bound to its listen address but not yet serving.
///
/// Binding first lets callers learn the actual port (for `bind` port `0`)
/// and advertise it before requests arrive.
#[derive(Debug)]
pub struct TestResourcesServer {
    listener: TcpListener,
    addr: SocketAddr,
    state: ServerState,
}

impl TestResourcesServer {
    /// Bind `config.bind` for `state`.
    pub async fn bind(config: &ServerConfig, state: ServerState) -> Result<Self> {
        let listener = TcpListener::bind(config.bind)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind,
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
        Ok(Self {
            listener,
            addr,
            state,
        })
    }

    /// The bound address.
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URI clients should use.
    pub fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Handler state.
    pub const fn state(&self) -> &ServerState {
        &self.state
    }

    /// Serve until `shutdown` completes, then destroy every cached resource.
    ///
    /// Request work still running after the last connection closes (a
    /// creation whose client already timed out) is awaited first, so its
    /// resource is destroyed too.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            addr,
            state,
        } = self;
        let cache = state.cache().clone();
        let tasks = state.tasks().clone();

        tracing::info!(%addr, resolvers = ?state.chain().ids(), "Test resources server listening");
        let served = axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown)
            .await;

        tasks.close();
        if !tasks.is_empty() {
            tracing::info!(pending = tasks.len(), "Waiting for in-flight requests");
        }
        tasks.wait().await;

        tracing::info!("Shutting down; closing all resources");
        let closed = cache.close_all().await;
        tracing::debug!(closed, "Resources closed");

        served.map_err(ServerError::Serve)
    }
}
