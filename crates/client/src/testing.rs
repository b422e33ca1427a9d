//! In-memory client for tests
//!
//! Answers a fixed set of properties without any server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use testbed_codec::{Envelope, PropertyEntries, PropertyMap};

use crate::client::TestResourcesClient;
use crate::error::ClientResult;

const WITH_REQUIREMENTS: &str = "property-with-requirements";
const REQUIRED: &str = "required-property";

/// Fake [`TestResourcesClient`] with fixed mock properties.
///
/// `property-with-requirements` only resolves once `required-property` is
/// among the supplied properties, and its value then carries that input.
#[derive(Debug)]
pub struct FakeTestResourcesClient {
    properties: BTreeMap<&'static str, &'static str>,
    closed_scopes: Mutex<Vec<String>>,
    closed_all: Mutex<u32>,
}

impl Default for FakeTestResourcesClient {
    fn default() -> Self {
        Self {
            properties: BTreeMap::from([
                ("first-property", "first supplied by test resources"),
                ("second-property", "second supplied by test resources"),
                ("some-property", "supplied by test resources"),
                (WITH_REQUIREMENTS, "supplied by test resources with requirements"),
            ]),
            closed_scopes: Mutex::new(Vec::new()),
            closed_all: Mutex::new(0),
        }
    }
}

impl FakeTestResourcesClient {
    /// Create the fake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope ids passed to `close_scope`, in call order.
    pub fn closed_scopes(&self) -> Vec<String> {
        self.closed_scopes.lock().clone()
    }

    /// Number of `close_all` calls.
    pub fn close_all_calls(&self) -> u32 {
        *self.closed_all.lock()
    }
}

#[async_trait]
impl TestResourcesClient for FakeTestResourcesClient {
    async fn resolvable_properties(
        &self,
        _: &PropertyEntries,
        _: &PropertyMap,
    ) -> ClientResult<Option<Envelope<Vec<String>>>> {
        let names = self.properties.keys().map(ToString::to_string).collect();
        Ok(Some(Envelope::Value(names)))
    }

    async fn resolve(
        &self,
        name: &str,
        properties: &PropertyMap,
        _: &PropertyMap,
    ) -> ClientResult<Option<Envelope<String>>> {
        let value = self.properties.get(name).and_then(|value| {
            if name != WITH_REQUIREMENTS {
                return Some((*value).to_string());
            }
            properties
                .get(REQUIRED)
                .map(|required| format!("{value}: {required}"))
        });
        Ok(Some(Envelope::of(value)))
    }

    async fn required_properties(
        &self,
        expression: &str,
    ) -> ClientResult<Option<Envelope<Vec<String>>>> {
        let required = if expression == WITH_REQUIREMENTS {
            vec![REQUIRED.to_string()]
        } else {
            Vec::new()
        };
        Ok(Some(Envelope::Value(required)))
    }

    async fn required_property_entries(&self) -> ClientResult<Option<Envelope<Vec<String>>>> {
        Ok(Some(Envelope::Value(Vec::new())))
    }

    async fn close_scope(&self, id: &str) -> ClientResult<Option<Envelope<bool>>> {
        self.closed_scopes.lock().push(id.to_string());
        Ok(Some(Envelope::Value(true)))
    }

    async fn close_all(&self) -> ClientResult<Option<Envelope<bool>>> {
        *self.closed_all.lock() += 1;
        Ok(Some(Envelope::Value(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testbed_codec::Value;

    #[tokio::test]
    async fn requirements_gate_value() {
        let fake = FakeTestResourcesClient::new();
        let none = PropertyMap::new();

        assert_eq!(
            fake.resolve("first-property", &none, &none).await.unwrap(),
            Some(Envelope::Value("first supplied by test resources".into()))
        );
        assert_eq!(
            fake.resolve(WITH_REQUIREMENTS, &none, &none).await.unwrap(),
            Some(Envelope::Empty)
        );

        let mut props = PropertyMap::new();
        props.insert(REQUIRED.into(), Value::from("42"));
        assert_eq!(
            fake.resolve(WITH_REQUIREMENTS, &props, &none).await.unwrap(),
            Some(Envelope::Value(
                "supplied by test resources with requirements: 42".into()
            ))
        );
        assert_eq!(
            fake.resolve("unknown", &none, &none).await.unwrap(),
            Some(Envelope::Empty)
        );
    }

    #[tokio::test]
    async fn records_closes() {
        let fake = FakeTestResourcesClient::new();
        fake.close_scope("a").await.unwrap();
        fake.close_scope("b").await.unwrap();
        fake.close_all().await.unwrap();
        assert_eq!(fake.closed_scopes(), vec!["a", "b"]);
        assert_eq!(fake.close_all_calls(), 1);
    }
}
