//! # testbed-server
//!
//! HTTP surface of the resolution server: six binary-encoded operations
//! over a [`testbed_resolver::ResolverChain`] and a
//! [`testbed_resource::ResourceCache`], guarded by an optional access token.
//!
//! ```no_run
//! use testbed_resolver::{ResolverChain, StaticResolver};
//! use testbed_server::{ServerConfig, ServerState, TestResourcesServer};
//!
//! # async fn run() -> testbed_server::Result<()> {
//! let config = ServerConfig::default();
//! let chain = ResolverChain::new().with(StaticResolver::new("fixed").with_property("a", "1"));
//! let server = TestResourcesServer::bind(&config, ServerState::from_config(&config, chain)).await?;
//! println!("listening on {}", server.uri());
//! server.serve(std::future::pending()).await
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ConfigValue, ServerConfig};
pub use discovery::write_discovery_file;
pub use error::{Result, ServerError};
pub use routes::{WireBody, WireResponse, router};
pub use server::TestResourcesServer;
pub use state::{STATIC_RESOLVER_ID, ServerState};
