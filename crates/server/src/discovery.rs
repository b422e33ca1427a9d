//! Discovery file written for clients.
//!
//! A TOML document with a `[server]` table, the layout the client's
//! convention discovery reads:
//!
//! ```toml
//! [server]
//! uri = "http://127.0.0.1:40123"
//! access-token = "s3cret"
//! ```

use std::path::Path;

use serde::Serialize;

use crate::error::{Result, ServerError};

#[derive(Debug, Serialize)]
struct DiscoveryDocument<'a> {
    server: Advertised<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Advertised<'a> {
    uri: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
}

/// Write `server.uri` and, when set, `server.access-token` to `path`.
pub fn write_discovery_file(path: &Path, uri: &str, access_token: Option<&str>) -> Result<()> {
    let document = DiscoveryDocument {
        server: Advertised { uri, access_token },
    };
    let contents = toml::to_string(&document).map_err(|source| ServerError::DiscoveryFormat {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ServerError::DiscoveryFile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| ServerError::DiscoveryFile {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Wrote discovery file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_back(path: &Path) -> toml::Table {
        toml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn writes_uri_and_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("testbed.toml");

        write_discovery_file(&path, "http://127.0.0.1:1234", Some("tok")).unwrap();

        let table = read_back(&path);
        let server = table["server"].as_table().unwrap();
        assert_eq!(server["uri"].as_str(), Some("http://127.0.0.1:1234"));
        assert_eq!(server["access-token"].as_str(), Some("tok"));
    }

    #[test]
    fn token_omitted_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testbed.toml");

        write_discovery_file(&path, "http://localhost:1", None).unwrap();

        let table = read_back(&path);
        assert!(!table["server"].as_table().unwrap().contains_key("access-token"));
    }

    #[test]
    fn separators_and_escapes_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testbed.toml");
        let token = "a=b:c\\d \"quoted\"\n# not a comment";

        write_discovery_file(&path, "http://[::1]:4000/base", Some(token)).unwrap();

        let table = read_back(&path);
        let server = table["server"].as_table().unwrap();
        assert_eq!(server["uri"].as_str(), Some("http://[::1]:4000/base"));
        assert_eq!(server["access-token"].as_str(), Some(token));
    }
}
