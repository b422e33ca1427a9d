//! HTTP transport

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use testbed_codec::{
    ACCESS_TOKEN_HEADER, Envelope, ListRequest, MEDIA_TYPE, PropertyEntries, PropertyMap,
    ResolveRequest, USER_AGENT, Wire, decode, encode,
};
use url::Url;

use crate::client::TestResourcesClient;
use crate::error::{ClientError, ClientResult};

/// Connection settings for [`HttpTestResourcesClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URI of the server, e.g. `http://127.0.0.1:40123`
    pub server_uri: String,
    /// Sent as `Access-Token` when present
    pub access_token: Option<String>,
    /// Applied as both connect and per-request timeout
    pub client_timeout: Duration,
}

impl ClientConfig {
    /// Default client timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Settings for `server_uri` with no token and the default timeout.
    pub fn new(server_uri: impl Into<String>) -> Self {
        Self {
            server_uri: server_uri.into(),
            access_token: None,
            client_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set the access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the client timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }
}

/// [`TestResourcesClient`] over HTTP with codec-encoded bodies.
///
/// No request is retried; a timed-out call may still complete server-side.
#[derive(Debug, Clone)]
pub struct HttpTestResourcesClient {
    http: reqwest::Client,
    base: Url,
    access_token: Option<String>,
}

impl HttpTestResourcesClient {
    /// Build a client. Fails on an unusable URI.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base = Url::parse(&config.server_uri)
            .map_err(|e| ClientError::InvalidUri(format!("{}: {e}", config.server_uri)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUri(config.server_uri));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.client_timeout)
            .timeout(config.client_timeout)
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Self {
            http,
            base,
            access_token: config.access_token,
        })
    }

    /// The server base URI.
    pub const fn base_uri(&self) -> &Url {
        &self.base
    }

    /// Base URI with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUri(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<T: Wire>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Bytes>,
    ) -> ClientResult<Option<Envelope<T>>> {
        let url = self.url(segments)?;
        tracing::trace!(%method, %url, "Sending request");

        let mut request = self
            .http
            .request(method, url.clone())
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .header(ACCEPT, MEDIA_TYPE);
        if let Some(token) = &self.access_token {
            request = request.header(ACCESS_TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(%url, %status, "Server answered without a result");
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        Ok(Some(decode::<Envelope<T>>(&bytes)?))
    }
}

#[async_trait]
impl TestResourcesClient for HttpTestResourcesClient {
    async fn resolvable_properties(
        &self,
        entries: &PropertyEntries,
        config: &PropertyMap,
    ) -> ClientResult<Option<Envelope<Vec<String>>>> {
        let body = encode(&ListRequest {
            property_entries: entries.clone(),
            test_resources_config: config.clone(),
        });
        self.call(Method::POST, &["list"], Some(body)).await
    }

    async fn resolve(
        &self,
        name: &str,
        properties: &PropertyMap,
        config: &PropertyMap,
    ) -> ClientResult<Option<Envelope<String>>> {
        let body = encode(&ResolveRequest {
            name: name.to_string(),
            properties: properties.clone(),
            test_resources_config: config.clone(),
        });
        self.call(Method::POST, &["resolve"], Some(body)).await
    }

    async fn required_properties(
        &self,
        expression: &str,
    ) -> ClientResult<Option<Envelope<Vec<String>>>> {
        self.call(Method::GET, &["requirements", "expr", expression], None)
            .await
    }

    async fn required_property_entries(&self) -> ClientResult<Option<Envelope<Vec<String>>>> {
        self.call(Method::GET, &["requirements", "entries"], None)
            .await
    }

    async fn close_scope(&self, id: &str) -> ClientResult<Option<Envelope<bool>>> {
        self.call(Method::GET, &["close", id], None).await
    }

    async fn close_all(&self) -> ClientResult<Option<Envelope<bool>>> {
        self.call(Method::GET, &["close", "all"], None).await
    }
}
