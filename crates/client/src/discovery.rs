//! Locating a running server.
//!
//! The convention: environment variables win over a `testbed.toml` file
//! found in one of the search paths. The file is the one written by the
//! server binary at startup:
//!
//! ```toml
//! [server]
//! uri = "http://127.0.0.1:40123"
//! access-token = "s3cret"
//! client-read-timeout = 60
//! ```
//!
//! `TESTBED_SERVER_URI`, `TESTBED_SERVER_ACCESS_TOKEN` and
//! `TESTBED_SERVER_CLIENT_READ_TIMEOUT` override the matching keys.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

use crate::client::TestResourcesClient;
use crate::error::{ClientError, ClientResult};
use crate::http::{ClientConfig, HttpTestResourcesClient};

/// Name of the discovery file.
pub const DISCOVERY_FILE: &str = "testbed.toml";

/// Environment variable naming an extra directory to search.
pub const CONFIG_DIR_ENV: &str = "TESTBED_CONFIG_DIR";

const ENV_PREFIX: &str = "TESTBED_";

/// Environment keys (after the prefix) and the document keys they override.
const ENV_KEYS: [(&str, &str); 3] = [
    ("server_uri", "server.uri"),
    ("server_access_token", "server.access-token"),
    ("server_client_read_timeout", "server.client-read-timeout"),
];

/// Finds a client for the current process.
pub trait ClientDiscovery: Send + Sync {
    /// A client for the discovered server, or `None` when there is none.
    fn discover(&self) -> Option<Arc<dyn TestResourcesClient>>;
}

impl<F> ClientDiscovery for F
where
    F: Fn() -> Option<Arc<dyn TestResourcesClient>> + Send + Sync,
{
    fn discover(&self) -> Option<Arc<dyn TestResourcesClient>> {
        self()
    }
}

/// Environment + discovery-file discovery.
#[derive(Debug, Clone)]
pub struct ConventionDiscovery {
    search_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl Default for ConventionDiscovery {
    fn default() -> Self {
        let mut search_paths = vec![PathBuf::from(".")];
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            search_paths.push(PathBuf::from(dir));
        }
        Self {
            search_paths,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }
}

impl ConventionDiscovery {
    /// Search the current directory and `$TESTBED_CONFIG_DIR`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the directories searched for the discovery file.
    #[must_use]
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths = paths.into_iter().collect();
        self
    }

    /// Change the environment variable prefix (`TESTBED_` by default).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// First existing discovery file among the search paths.
    pub fn find_file(&self) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(DISCOVERY_FILE))
            .find(|path| path.is_file())
    }

    /// Client settings, or `None` when no server URI is configured.
    pub fn load(&self) -> ClientResult<Option<ClientConfig>> {
        let mut figment = Figment::new();

        if let Some(path) = self.find_file() {
            tracing::debug!(path = %path.display(), "Reading discovery file");
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(&self.env_prefix).filter_map(|key| {
            ENV_KEYS
                .iter()
                .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
                .map(|(_, path)| (*path).into())
        }));

        let settings: Settings = figment
            .extract()
            .map_err(|e| ClientError::Discovery(e.to_string()))?;
        settings.into_config()
    }
}

impl ClientDiscovery for ConventionDiscovery {
    fn discover(&self) -> Option<Arc<dyn TestResourcesClient>> {
        let config = match self.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::debug!("No test resources server configured");
                return None;
            }
            Err(error) => {
                tracing::warn!(%error, "Ignoring unreadable discovery settings");
                return None;
            }
        };

        match HttpTestResourcesClient::new(config) {
            Ok(client) => {
                tracing::info!(uri = %client.base_uri(), "Discovered test resources server");
                Some(Arc::new(client))
            }
            Err(error) => {
                tracing::warn!(%error, "Discovered server is unusable");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Scalar as produced by either provider; env values arrive typed.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Flag(bool),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Unsigned(n) => n.to_string(),
            Self::Signed(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    server: ServerSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct ServerSettings {
    uri: Option<Scalar>,
    access_token: Option<Scalar>,
    client_read_timeout: Option<Scalar>,
}

impl Settings {
    fn into_config(self) -> ClientResult<Option<ClientConfig>> {
        let ServerSettings {
            uri,
            access_token,
            client_read_timeout,
        } = self.server;
        let Some(uri) = uri
            .map(Scalar::into_text)
            .filter(|uri| !uri.is_empty())
        else {
            return Ok(None);
        };

        let mut config = ClientConfig::new(uri);
        config.access_token = access_token
            .map(Scalar::into_text)
            .filter(|token| !token.is_empty());

        if let Some(timeout) = client_read_timeout {
            let text = timeout.into_text();
            let secs: u64 = text.parse().map_err(|_| {
                ClientError::Discovery(format!("invalid client read timeout '{text}'"))
            })?;
            config.client_timeout = Duration::from_secs(secs);
        }

        Ok(Some(config))
    }
}
