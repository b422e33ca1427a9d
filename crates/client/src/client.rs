//! The client trait

use async_trait::async_trait;
use testbed_codec::{Envelope, PropertyEntries, PropertyMap};

use crate::error::ClientResult;

/// The six remote operations of a resolution server.
///
/// Every method distinguishes three outcomes: `Ok(Some(envelope))` for a
/// completed call (which may still carry `Empty` or `Error`), `Ok(None)`
/// when the server answered with a non-200 status, and `Err` for an I/O
/// failure.
#[async_trait]
pub trait TestResourcesClient: Send + Sync {
    /// Property names the server can resolve for this application.
    async fn resolvable_properties(
        &self,
        entries: &PropertyEntries,
        config: &PropertyMap,
    ) -> ClientResult<Option<Envelope<Vec<String>>>>;

    /// Resolve one property.
    async fn resolve(
        &self,
        name: &str,
        properties: &PropertyMap,
        config: &PropertyMap,
    ) -> ClientResult<Option<Envelope<String>>>;

    /// Properties that must be resolved before `expression`.
    async fn required_properties(
        &self,
        expression: &str,
    ) -> ClientResult<Option<Envelope<Vec<String>>>>;

    /// Property entries the server needs as bulk input.
    async fn required_property_entries(&self) -> ClientResult<Option<Envelope<Vec<String>>>>;

    /// Destroy the resources owned by scope `id`.
    async fn close_scope(&self, id: &str) -> ClientResult<Option<Envelope<bool>>>;

    /// Destroy every resource.
    async fn close_all(&self) -> ClientResult<Option<Envelope<bool>>>;
}
