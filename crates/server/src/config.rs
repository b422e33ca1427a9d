//! Server configuration
//!
//! Plain serde types; the binary layers them with figment.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};
use testbed_codec::{PropertyMap, Value};

/// Settings of one resolution server instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address to listen on. Port `0` picks a free port.
    pub bind: SocketAddr,
    /// Token every request must carry in `Access-Token`. `None` trusts all
    /// callers.
    pub access_token: Option<String>,
    /// Fixed `name → value` answers served by a static resolver.
    pub static_properties: BTreeMap<String, String>,
    /// Server-wide defaults merged under each request's configuration.
    pub test_resources_config: BTreeMap<String, ConfigValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            access_token: None,
            static_properties: BTreeMap::new(),
            test_resources_config: BTreeMap::new(),
        }
    }
}

impl ServerConfig {
    /// The configured defaults as wire values.
    pub fn default_config(&self) -> PropertyMap {
        self.test_resources_config
            .iter()
            .map(|(key, value)| (key.clone(), value.to_value()))
            .collect()
    }

    /// The access token, treating a blank token as none.
    pub fn effective_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// A configuration value as written in TOML or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// `true` / `false`
    Bool(bool),
    /// Integer, sent as text
    Integer(i64),
    /// String
    Text(String),
    /// List of strings
    List(Vec<String>),
    /// Nested table
    Table(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Convert to the wire representation.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(n) => Value::Str(n.to_string()),
            Self::Text(s) => Value::Str(s.clone()),
            Self::List(items) => Value::List(items.clone()),
            Self::Table(table) => Value::Map(
                table
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_value()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert!(config.bind.ip().is_loopback());
        assert_eq!(config.bind.port(), 0);
        assert_eq!(config.effective_token(), None);
    }

    #[test]
    fn reads_kebab_case_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
            bind = "0.0.0.0:8080"
            access-token = "t"

            [static-properties]
            "app.mode" = "test"

            [test-resources-config]
            "containers.redis.image-name" = "redis:7"
            retries = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.effective_token(), Some("t"));
        assert_eq!(config.static_properties["app.mode"], "test");
        let defaults = config.default_config();
        assert_eq!(
            defaults.get("containers.redis.image-name"),
            Some(&Value::from("redis:7"))
        );
        assert_eq!(defaults.get("retries"), Some(&Value::from("3")));
    }

    #[test]
    fn blank_token_is_none() {
        let config = ServerConfig {
            access_token: Some("  ".into()),
            ..ServerConfig::default()
        };
        assert_eq!(config.effective_token(), None);
    }

    #[test]
    fn nested_defaults_become_maps() {
        let mut postgres = BTreeMap::new();
        postgres.insert("image-name".to_string(), ConfigValue::from("postgres:16"));
        let mut containers = BTreeMap::new();
        containers.insert("postgres".to_string(), ConfigValue::Table(postgres));

        let config = ServerConfig {
            test_resources_config: BTreeMap::from([
                ("containers".to_string(), ConfigValue::Table(containers)),
                ("reuse".to_string(), ConfigValue::Bool(true)),
            ]),
            ..ServerConfig::default()
        };

        let map = config.default_config();
        assert_eq!(map.get("reuse"), Some(&Value::Bool(true)));
        let image = map
            .get("containers")
            .and_then(Value::as_map)
            .and_then(|m| m.get("postgres"))
            .and_then(Value::as_map)
            .and_then(|m| m.get("image-name"))
            .and_then(Value::as_str);
        assert_eq!(image, Some("postgres:16"));
    }
}
