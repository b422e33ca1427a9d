//! Convention-based discovery: environment over discovery file.
//!
//! `figment::Jail` isolates the environment and working directory of each
//! test.

use std::time::Duration;

use figment::Jail;
use testbed_client::{
    ClientConfig, ClientDiscovery, ClientError, ConventionDiscovery, DISCOVERY_FILE,
};

fn jail_error(e: ClientError) -> figment::Error {
    figment::Error::from(e.to_string())
}

#[test]
fn nothing_configured() {
    Jail::expect_with(|_jail| {
        let discovery = ConventionDiscovery::new();
        assert_eq!(discovery.load().map_err(jail_error)?, None);
        assert!(discovery.discover().is_none());
        Ok(())
    });
}

#[test]
fn file_in_current_directory() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DISCOVERY_FILE,
            r#"
            [server]
            uri = "http://127.0.0.1:4321"
            access-token = "from-file"
            client-read-timeout = 7
            "#,
        )?;

        let config = ConventionDiscovery::new().load().map_err(jail_error)?;
        assert_eq!(
            config,
            Some(
                ClientConfig::new("http://127.0.0.1:4321")
                    .with_access_token("from-file")
                    .with_timeout(Duration::from_secs(7))
            )
        );
        Ok(())
    });
}

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DISCOVERY_FILE,
            r#"
            [server]
            uri = "http://127.0.0.1:1111"
            access-token = "from-file"
            "#,
        )?;
        jail.set_env("TESTBED_SERVER_URI", "http://127.0.0.1:2222");
        jail.set_env("TESTBED_SERVER_CLIENT_READ_TIMEOUT", "12");

        let config = ConventionDiscovery::new()
            .load()
            .map_err(jail_error)?
            .expect("configured");
        assert_eq!(config.server_uri, "http://127.0.0.1:2222");
        assert_eq!(config.access_token.as_deref(), Some("from-file"));
        assert_eq!(config.client_timeout, Duration::from_secs(12));
        Ok(())
    });
}

#[test]
fn config_dir_searched() {
    Jail::expect_with(|jail| {
        std::fs::create_dir("conf").map_err(|e| e.to_string())?;
        jail.create_file(
            format!("conf/{DISCOVERY_FILE}"),
            "[server]\nuri = \"http://localhost:9\"\n",
        )?;
        jail.set_env("TESTBED_CONFIG_DIR", jail.directory().join("conf").display());

        let discovery = ConventionDiscovery::new();
        assert!(discovery.find_file().is_some());
        assert!(discovery.discover().is_some());
        Ok(())
    });
}

#[test]
fn custom_prefix_and_paths() {
    Jail::expect_with(|jail| {
        jail.set_env("TESTBED_SERVER_URI", "http://ignored:1");
        jail.set_env("OTHER_SERVER_URI", "http://127.0.0.1:3333");

        let config = ConventionDiscovery::new()
            .with_search_paths(Vec::new())
            .with_env_prefix("OTHER_")
            .load()
            .map_err(jail_error)?
            .expect("configured");
        assert_eq!(config.server_uri, "http://127.0.0.1:3333");
        assert_eq!(config.client_timeout, ClientConfig::DEFAULT_TIMEOUT);
        Ok(())
    });
}

#[test]
fn bad_timeout_is_discovery_error() {
    Jail::expect_with(|jail| {
        jail.set_env("TESTBED_SERVER_URI", "http://127.0.0.1:1");
        jail.set_env("TESTBED_SERVER_CLIENT_READ_TIMEOUT", "soon");

        let discovery = ConventionDiscovery::new();
        assert!(matches!(discovery.load(), Err(ClientError::Discovery(_))));
        assert!(discovery.discover().is_none());
        Ok(())
    });
}

#[test]
fn separators_inside_values_kept() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DISCOVERY_FILE,
            r#"
            [server]
            uri = "http://127.0.0.1:4000"
            access-token = 'a=b:c\d#e'
            "#,
        )?;

        let config = ConventionDiscovery::new()
            .load()
            .map_err(jail_error)?
            .expect("configured");
        assert_eq!(config.server_uri, "http://127.0.0.1:4000");
        assert_eq!(config.access_token.as_deref(), Some("a=b:c\\d#e"));
        Ok(())
    });
}

#[test]
fn malformed_file_is_discovery_error() {
    Jail::expect_with(|jail| {
        jail.create_file(DISCOVERY_FILE, "server.uri=http://127.0.0.1:4000\n")?;

        let discovery = ConventionDiscovery::new();
        assert!(matches!(discovery.load(), Err(ClientError::Discovery(_))));
        assert!(discovery.discover().is_none());
        Ok(())
    });
}
