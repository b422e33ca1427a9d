//! Layered configuration: defaults, then the TOML file, then `TESTBED_*`
//! environment variables, then command-line flags.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use testbed_server::ServerConfig;

use crate::cli::Overrides;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TESTBED_";

/// Top-level keys that may come from the environment.
const ENV_KEYS: [&str; 4] = [
    "bind",
    "access-token",
    "static-properties",
    "test-resources-config",
];

pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<ServerConfig, figment::Error> {
    let mut figment = Figment::new().merge(Serialized::defaults(ServerConfig::default()));

    if let Some(path) = file {
        tracing::debug!(path = %path.display(), "Loading configuration file");
        figment = figment.merge(Toml::file_exact(path));
    }

    figment
        .merge(
            Env::prefixed(ENV_PREFIX)
                .map(|key| key.as_str().replace('_', "-").into())
                .filter(|key| ENV_KEYS.contains(&key.as_str())),
        )
        .merge(Serialized::defaults(overrides))
        .extract()
}
