//! Request payloads for the `POST` operations
//!
//! Both requests travel as a single mapping so that the server can evolve
//! them by adding keys.

use bytes::BytesMut;

use crate::error::{DecodeError, Result};
use crate::value::{PropertyEntries, PropertyMap, Value};
use crate::wire::{Reader, Wire};

const PROPERTY_ENTRIES: &str = "propertyEntries";
const TEST_RESOURCES_CONFIG: &str = "testResourcesConfig";
const NAME: &str = "name";
const PROPERTIES: &str = "properties";

/// Body of `POST /list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Property entries found in the application's configuration
    pub property_entries: PropertyEntries,
    /// Test resources configuration of the application
    pub test_resources_config: PropertyMap,
}

/// Body of `POST /resolve`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    /// The property to resolve
    pub name: String,
    /// Properties already resolved by the caller
    pub properties: PropertyMap,
    /// Test resources configuration of the application
    pub test_resources_config: PropertyMap,
}

fn take(map: &mut PropertyMap, field: &'static str) -> Result<Value> {
    map.remove(field).ok_or(DecodeError::MissingField(field))
}

fn take_map(map: &mut PropertyMap, field: &'static str) -> Result<PropertyMap> {
    match take(map, field)? {
        Value::Map(inner) => Ok(inner),
        _ => Err(DecodeError::InvalidField {
            field,
            expected: "a map",
        }),
    }
}

fn entries_to_value(entries: &PropertyEntries) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::List(v.clone())))
            .collect(),
    )
}

fn entries_from_value(map: PropertyMap) -> Result<PropertyEntries> {
    map.into_iter()
        .map(|(k, v)| match v {
            Value::List(items) => Ok((k, items)),
            _ => Err(DecodeError::InvalidField {
                field: PROPERTY_ENTRIES,
                expected: "a map of lists",
            }),
        })
        .collect()
}

impl Wire for ListRequest {
    fn write(&self, buf: &mut BytesMut) {
        let mut map = PropertyMap::new();
        map.insert(PROPERTY_ENTRIES.into(), entries_to_value(&self.property_entries));
        map.insert(
            TEST_RESOURCES_CONFIG.into(),
            Value::Map(self.test_resources_config.clone()),
        );
        map.write(buf);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let mut map = PropertyMap::read(reader)?;
        Ok(Self {
            property_entries: entries_from_value(take_map(&mut map, PROPERTY_ENTRIES)?)?,
            test_resources_config: take_map(&mut map, TEST_RESOURCES_CONFIG)?,
        })
    }
}

impl Wire for ResolveRequest {
    fn write(&self, buf: &mut BytesMut) {
        let mut map = PropertyMap::new();
        map.insert(NAME.into(), Value::Str(self.name.clone()));
        map.insert(PROPERTIES.into(), Value::Map(self.properties.clone()));
        map.insert(
            TEST_RESOURCES_CONFIG.into(),
            Value::Map(self.test_resources_config.clone()),
        );
        map.write(buf);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let mut map = PropertyMap::read(reader)?;
        let name = match take(&mut map, NAME)? {
            Value::Str(name) => name,
            _ => {
                return Err(DecodeError::InvalidField {
                    field: NAME,
                    expected: "a string",
                });
            }
        };
        Ok(Self {
            name,
            properties: take_map(&mut map, PROPERTIES)?,
            test_resources_config: take_map(&mut map, TEST_RESOURCES_CONFIG)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{decode, encode};

    #[test]
    fn resolve_request_missing_name() {
        let mut map = PropertyMap::new();
        map.insert(PROPERTIES.into(), Value::Map(PropertyMap::new()));
        map.insert(TEST_RESOURCES_CONFIG.into(), Value::Map(PropertyMap::new()));
        let err = decode::<ResolveRequest>(&encode(&map)).unwrap_err();
        assert_eq!(err, DecodeError::MissingField("name"));
    }

    #[test]
    fn resolve_request_name_must_be_string() {
        let mut map = PropertyMap::new();
        map.insert(NAME.into(), Value::Bool(true));
        map.insert(PROPERTIES.into(), Value::Map(PropertyMap::new()));
        map.insert(TEST_RESOURCES_CONFIG.into(), Value::Map(PropertyMap::new()));
        let err = decode::<ResolveRequest>(&encode(&map)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField {
                field: "name",
                expected: "a string"
            }
        );
    }

    #[test]
    fn list_request_rejects_non_list_entries() {
        let mut entries = PropertyMap::new();
        entries.insert("datasources".into(), Value::Str("default".into()));
        let mut map = PropertyMap::new();
        map.insert(PROPERTY_ENTRIES.into(), Value::Map(entries));
        map.insert(TEST_RESOURCES_CONFIG.into(), Value::Map(PropertyMap::new()));
        assert!(matches!(
            decode::<ListRequest>(&encode(&map)),
            Err(DecodeError::InvalidField { field: "propertyEntries", .. })
        ));
    }
}
