//! # testbed-client
//!
//! Thin client for a testbed resolution server.
//!
//! - [`TestResourcesClient`]: the six remote operations
//! - [`HttpTestResourcesClient`]: reqwest transport speaking the binary codec
//! - [`ConventionDiscovery`]: finds the server from the environment or a
//!   `testbed.toml` file
//! - [`ClientPropertySource`]: what an application framework plugs into its
//!   configuration loading

pub mod client;
pub mod discovery;
pub mod error;
pub mod http;
pub mod source;
#[cfg(feature = "testing")]
pub mod testing;

pub use client::TestResourcesClient;
pub use discovery::{ClientDiscovery, ConventionDiscovery, DISCOVERY_FILE};
pub use error::{ClientError, ClientResult};
pub use http::{ClientConfig, HttpTestResourcesClient};
pub use source::ClientPropertySource;
#[cfg(feature = "testing")]
pub use testing::FakeTestResourcesClient;
