//! Per-container settings read from the test resources configuration.
//!
//! Settings live under `containers.<simple-name>.*`. Clients send them
//! either as flat dotted keys or as nested mappings, and any mix of the two.

use testbed_codec::{PropertyMap, Value};

const CONTAINERS: &str = "containers";
const IMAGE_NAME: &str = "image-name";

/// Settings for one container kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerMetadata {
    /// Image override, replacing the provider's default image
    pub image_name: Option<String>,
}

impl ContainerMetadata {
    /// Settings for `simple_name`, or `None` when the configuration has none.
    pub fn for_name(simple_name: &str, config: &PropertyMap) -> Option<Self> {
        let image_name = lookup(config, &[CONTAINERS, simple_name, IMAGE_NAME])
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        image_name.map(|image_name| Self {
            image_name: Some(image_name),
        })
    }
}

/// Find `path` in `map`, where every prefix of the remaining path may be
/// stored as one dotted key. Longer dotted keys win over nesting.
fn lookup<'a>(map: &'a PropertyMap, path: &[&str]) -> Option<&'a Value> {
    (1..=path.len()).rev().find_map(|take| {
        let value = map.get(&path[..take].join("."))?;
        if take == path.len() {
            Some(value)
        } else {
            lookup(value.as_map()?, &path[take..])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Value)]) -> PropertyMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn flat_key() {
        let config = map(&[("containers.postgres.image-name", "postgres:15".into())]);
        assert_eq!(
            ContainerMetadata::for_name("postgres", &config),
            Some(ContainerMetadata {
                image_name: Some("postgres:15".into())
            })
        );
    }

    #[test]
    fn nested_maps() {
        let inner = map(&[("image-name", "postgres:14".into())]);
        let containers = map(&[("postgres", Value::Map(inner))]);
        let config = map(&[("containers", Value::Map(containers))]);
        let md = ContainerMetadata::for_name("postgres", &config).unwrap();
        assert_eq!(md.image_name.as_deref(), Some("postgres:14"));
    }

    #[test]
    fn mixed_nesting() {
        let containers = map(&[("postgres.image-name", "postgres:13".into())]);
        let config = map(&[("containers", Value::Map(containers))]);
        let md = ContainerMetadata::for_name("postgres", &config).unwrap();
        assert_eq!(md.image_name.as_deref(), Some("postgres:13"));
    }

    #[test]
    fn other_container_or_absent() {
        let config = map(&[("containers.mysql.image-name", "mysql:8".into())]);
        assert_eq!(ContainerMetadata::for_name("postgres", &config), None);
        assert_eq!(ContainerMetadata::for_name("postgres", &PropertyMap::new()), None);
    }

    #[test]
    fn non_string_ignored() {
        let config = map(&[("containers.postgres.image-name", Value::Bool(true))]);
        assert_eq!(ContainerMetadata::for_name("postgres", &config), None);
    }
}
