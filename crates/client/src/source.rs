//! Property-source adapter.
//!
//! Bridges an application's configuration loading to the server: which
//! property entries to collect, and which keys the server can produce. The
//! application keeps starting when no server is around; every failure
//! degrades to "nothing to contribute".

use std::sync::Arc;

use parking_lot::Mutex;
use testbed_codec::{Envelope, PropertyEntries, PropertyMap};

use crate::client::TestResourcesClient;
use crate::discovery::ClientDiscovery;
use crate::error::ClientResult;

/// Lazily discovered client plus the two queries a property source needs.
pub struct ClientPropertySource<D> {
    discovery: D,
    /// `None` until discovery ran; then the outcome, including "no server".
    client: Mutex<Option<Option<Arc<dyn TestResourcesClient>>>>,
}

impl<D: ClientDiscovery> ClientPropertySource<D> {
    /// Create an adapter; discovery is deferred to first use.
    pub const fn new(discovery: D) -> Self {
        Self {
            discovery,
            client: Mutex::new(None),
        }
    }

    /// The discovered client. Discovery runs at most once per adapter.
    pub fn client(&self) -> Option<Arc<dyn TestResourcesClient>> {
        self.client
            .lock()
            .get_or_insert_with(|| {
                let client = self.discovery.discover();
                if client.is_none() {
                    tracing::info!("No test resources server found; properties will not be resolved");
                }
                client
            })
            .clone()
    }

    /// Property entries the server wants collected. Empty without a server.
    pub async fn property_entries(&self) -> Vec<String> {
        let Some(client) = self.client() else {
            return Vec::new();
        };
        names_or_empty("required property entries", client.required_property_entries().await)
    }

    /// Keys the server can produce for this application. Empty without a
    /// server.
    pub async fn produce_keys(
        &self,
        entries: &PropertyEntries,
        config: &PropertyMap,
    ) -> Vec<String> {
        let Some(client) = self.client() else {
            return Vec::new();
        };
        names_or_empty(
            "resolvable properties",
            client.resolvable_properties(entries, config).await,
        )
    }
}

impl<D> std::fmt::Debug for ClientPropertySource<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.client.lock() {
            None => "undiscovered",
            Some(None) => "absent",
            Some(Some(_)) => "connected",
        };
        f.debug_struct("ClientPropertySource")
            .field("client", &state)
            .finish_non_exhaustive()
    }
}

fn names_or_empty(
    operation: &str,
    outcome: ClientResult<Option<Envelope<Vec<String>>>>,
) -> Vec<String> {
    match outcome {
        Ok(Some(Envelope::Value(names))) => names,
        Ok(Some(Envelope::Empty)) => {
            tracing::debug!(operation, "Server returned no value");
            Vec::new()
        }
        Ok(Some(Envelope::Error(description))) => {
            tracing::warn!(operation, %description, "Server reported an error");
            Vec::new()
        }
        Ok(None) => {
            tracing::warn!(operation, "Server answered with a non-success status");
            Vec::new()
        }
        Err(error) => {
            tracing::warn!(operation, %error, "Call to test resources server failed");
            Vec::new()
        }
    }
}
